//! File ingestion
//!
//! Copies local files into the namespaced shared media store, gated by
//! storage permission and platform support.

pub mod operations;
pub mod platform;
pub mod results;

pub use operations::{IngestService, IngestSettings};
pub use platform::{Capabilities, NAMESPACED_STORAGE_MIN_API_LEVEL};
pub use results::{IngestLimits, IngestOutcome};
