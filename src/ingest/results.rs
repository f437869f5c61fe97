//! Ingestion result types

use crate::config::RuntimeConfig;
use crate::error::IngestError;
use crate::storage::{Locator, StorageEntry};

/// Limits applied to a single ingestion, taken from runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestLimits {
    pub max_file_size_bytes: u64,
    pub cleanup_partial_entries: bool,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 100 * 1024 * 1024,
            cleanup_partial_entries: true,
        }
    }
}

impl From<&RuntimeConfig> for IngestLimits {
    fn from(runtime: &RuntimeConfig) -> Self {
        Self {
            max_file_size_bytes: runtime.max_file_size_bytes(),
            cleanup_partial_entries: runtime.cleanup_partial_entries,
        }
    }
}

/// Terminal state of one ingestion attempt
#[derive(Debug)]
pub enum IngestOutcome {
    /// Nothing was attempted (no permission, or unsupported platform)
    Skipped(IngestError),
    Succeeded(StorageEntry),
    Failed(IngestError),
}

impl IngestOutcome {
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            IngestOutcome::Succeeded(entry) => Some(&entry.locator),
            _ => None,
        }
    }

    pub fn into_locator(self) -> Option<Locator> {
        match self {
            IngestOutcome::Succeeded(entry) => Some(entry.locator),
            _ => None,
        }
    }
}

impl From<Result<StorageEntry, IngestError>> for IngestOutcome {
    fn from(result: Result<StorageEntry, IngestError>) -> Self {
        match result {
            Ok(entry) => IngestOutcome::Succeeded(entry),
            Err(e) if e.is_skip() => IngestOutcome::Skipped(e),
            Err(e) => IngestOutcome::Failed(e),
        }
    }
}
