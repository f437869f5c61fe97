//! Server core functionality
//!
//! The method channel listener and the operator console.

pub mod console;
pub mod listener;

pub use console::run_console;
pub use listener::Server;
