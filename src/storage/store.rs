//! Media store client
//!
//! The storage subsystem the ingestion operation writes into. Kept behind a
//! trait so the service can be wired to a fake in tests.

use std::io::{Read, Write};

use crate::error::StorageError;
use crate::storage::results::{Locator, NewEntry, StorageEntry};

pub trait MediaStore: Send + Sync {
    /// Allocates a new, pending, empty entry. Fails if the name is taken.
    fn insert(&self, entry: &NewEntry) -> Result<StorageEntry, StorageError>;

    /// Opens a write channel to an existing entry's contents
    fn open_writer(&self, locator: &Locator) -> Result<Box<dyn Write + Send>, StorageError>;

    /// Marks an entry complete and records its final size
    fn publish(&self, locator: &Locator, size_bytes: u64) -> Result<StorageEntry, StorageError>;

    /// Fails with `EntryPending` until the entry is published
    fn open_reader(&self, locator: &Locator) -> Result<Box<dyn Read + Send>, StorageError>;

    fn get(&self, locator: &Locator) -> Result<StorageEntry, StorageError>;

    fn delete(&self, locator: &Locator) -> Result<(), StorageError>;

    /// Lists every entry in a namespace, pending ones included
    fn list(&self, namespace: &str) -> Result<Vec<StorageEntry>, StorageError>;
}
