//! Storage result types
//!
//! Defines the entry records created and returned by the media store.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StorageError;

/// Scheme prefix of every locator handed out by the store
pub const LOCATOR_SCHEME: &str = "media://";

/// Stable reference to a stored entry, rendered as `media://<namespace>/<name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locator {
    namespace: String,
    display_name: String,
}

impl Locator {
    pub fn new(namespace: &str, display_name: &str) -> Self {
        Self {
            namespace: namespace.trim_matches('/').to_string(),
            display_name: display_name.to_string(),
        }
    }

    /// Parses a locator string back into its namespace and entry name
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let rest = raw
            .strip_prefix(LOCATOR_SCHEME)
            .ok_or_else(|| StorageError::InvalidLocator(raw.to_string()))?;

        match rest.rsplit_once('/') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self::new(namespace, name))
            }
            _ => Err(StorageError::InvalidLocator(raw.to_string())),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", LOCATOR_SCHEME, self.namespace, self.display_name)
    }
}

impl TryFrom<String> for Locator {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Locator::parse(&value)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        locator.to_string()
    }
}

/// Request to create a new entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub display_name: String,
    pub title: Option<String>,
    pub mime_type: Option<String>,
    pub relative_namespace: String,
}

/// An entry held by the media store
///
/// Entries are created pending and can only be opened for reading once
/// published with their final size. `get` and `list` report pending entries
/// with `pending = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub mime_type: Option<String>,
    pub relative_namespace: String,
    pub locator: Locator,
    pub size_bytes: u64,
    /// Unix timestamp (seconds) when the entry was inserted
    pub created_at: u64,
    pub pending: bool,
}
