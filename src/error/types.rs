//! Error types
//!
//! Defines domain-specific error types for each module of the storage bridge.

use std::fmt;
use std::io;

/// Media store errors
#[derive(Debug)]
pub enum StorageError {
    EntryAlreadyExists(String),
    EntryNotFound(String),
    EntryPending(String),
    InvalidLocator(String),
    InvalidNamespace(String),
    FileTooLarge { size: u64, limit: u64 },
    Metadata(serde_json::Error),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::EntryAlreadyExists(n) => write!(f, "Entry already exists: {}", n),
            StorageError::EntryNotFound(l) => write!(f, "Entry not found: {}", l),
            StorageError::EntryPending(l) => write!(f, "Entry not yet published: {}", l),
            StorageError::InvalidLocator(l) => write!(f, "Invalid locator: {}", l),
            StorageError::InvalidNamespace(n) => write!(f, "Invalid namespace: {}", n),
            StorageError::FileTooLarge { size, limit } => {
                write!(f, "File too large: {} bytes exceeds limit of {} bytes", size, limit)
            }
            StorageError::Metadata(e) => write!(f, "Metadata error: {}", e),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        StorageError::Metadata(error)
    }
}

/// File ingestion errors
///
/// `PermissionDenied` and `UnsupportedPlatform` mean nothing was attempted;
/// the other two mean the copy started and failed.
#[derive(Debug)]
pub enum IngestError {
    PermissionDenied,
    SourceUnreadable { path: String, source: io::Error },
    StorageRejected(StorageError),
    UnsupportedPlatform { api_level: u32 },
}

impl IngestError {
    /// True when the operation was skipped rather than attempted
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            IngestError::PermissionDenied | IngestError::UnsupportedPlatform { .. }
        )
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::PermissionDenied => write!(f, "Shared storage write permission not granted"),
            IngestError::SourceUnreadable { path, source } => {
                write!(f, "Source file unreadable: {}: {}", path, source)
            }
            IngestError::StorageRejected(e) => write!(f, "Storage rejected entry: {}", e),
            IngestError::UnsupportedPlatform { api_level } => write!(
                f,
                "Namespaced storage unsupported on platform API level {}",
                api_level
            ),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<StorageError> for IngestError {
    fn from(error: StorageError) -> Self {
        IngestError::StorageRejected(error)
    }
}

/// Method channel errors
#[derive(Debug)]
pub enum ChannelError {
    MalformedCall(String),
    MissingArgument(&'static str),
    RequestTooLong(usize),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::MalformedCall(msg) => write!(f, "Malformed method call: {}", msg),
            ChannelError::MissingArgument(name) => write!(f, "Missing argument: {}", name),
            ChannelError::RequestTooLong(len) => write!(f, "Request too long: {} bytes", len),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<serde_json::Error> for ChannelError {
    fn from(error: serde_json::Error) -> Self {
        ChannelError::MalformedCall(error.to_string())
    }
}

/// General bridge error that encompasses all error types
#[derive(Debug)]
pub enum BridgeError {
    Storage(StorageError),
    Ingest(IngestError),
    Channel(ChannelError),
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Storage(e) => write!(f, "Storage error: {}", e),
            BridgeError::Ingest(e) => write!(f, "Ingest error: {}", e),
            BridgeError::Channel(e) => write!(f, "Channel error: {}", e),
            BridgeError::Config(e) => write!(f, "Configuration error: {}", e),
            BridgeError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for BridgeError {}

impl From<StorageError> for BridgeError {
    fn from(error: StorageError) -> Self {
        BridgeError::Storage(error)
    }
}

impl From<IngestError> for BridgeError {
    fn from(error: IngestError) -> Self {
        BridgeError::Ingest(error)
    }
}

impl From<ChannelError> for BridgeError {
    fn from(error: ChannelError) -> Self {
        BridgeError::Channel(error)
    }
}

impl From<config::ConfigError> for BridgeError {
    fn from(error: config::ConfigError) -> Self {
        BridgeError::Config(error)
    }
}

impl From<io::Error> for BridgeError {
    fn from(error: io::Error) -> Self {
        BridgeError::IoError(error)
    }
}
