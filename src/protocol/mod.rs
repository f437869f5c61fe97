//! Method channel protocol
//!
//! Handles call parsing, dispatch, and reply formatting.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{CHANNEL_NAME, Method, parse_call};
pub use handlers::{BridgeContext, handle_call};
pub use responses::MethodReply;
