//! Error handling
//!
//! Defines error types and handling for the storage bridge.

pub mod handlers;
pub mod types;

pub use types::*;
