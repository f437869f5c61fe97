//! File ingestion operation
//!
//! Copies a local file into the shared media store. The service is stateless:
//! the store, the permission gate and the platform capabilities are injected,
//! and every call allocates a fresh uniquely named entry, so concurrent calls
//! need no coordination.

use log::{debug, error, info, warn};
use std::fs::File;
use std::io::{Read, Write};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{IngestError, StorageError};
use crate::ingest::platform::Capabilities;
use crate::ingest::results::{IngestLimits, IngestOutcome};
use crate::permissions::PermissionGate;
use crate::storage::{Locator, MediaStore, NewEntry, StorageEntry, mime_type_for_path};

/// Where entries go and which metadata they carry
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub namespace: String,
    pub include_title: bool,
    pub buffer_size: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            namespace: "Music/AppName".to_string(),
            include_title: true,
            buffer_size: 8192,
        }
    }
}

pub struct IngestService {
    store: Arc<dyn MediaStore>,
    gate: Arc<dyn PermissionGate>,
    capabilities: Capabilities,
    settings: IngestSettings,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn MediaStore>,
        gate: Arc<dyn PermissionGate>,
        capabilities: Capabilities,
        settings: IngestSettings,
    ) -> Self {
        Self {
            store,
            gate,
            capabilities,
            settings,
        }
    }

    pub fn gate(&self) -> &Arc<dyn PermissionGate> {
        &self.gate
    }

    pub fn store(&self) -> &Arc<dyn MediaStore> {
        &self.store
    }

    pub fn namespace(&self) -> &str {
        &self.settings.namespace
    }

    /// Copies `source_path` into the store and returns the new entry.
    ///
    /// Unsupported platforms and missing permission return an error before
    /// anything touches the store.
    pub fn ingest(
        &self,
        source_path: &str,
        limits: &IngestLimits,
    ) -> Result<StorageEntry, IngestError> {
        if !self.capabilities.supports_namespaced_storage {
            return Err(IngestError::UnsupportedPlatform {
                api_level: self.capabilities.api_level,
            });
        }

        if !self.gate.is_granted() {
            return Err(IngestError::PermissionDenied);
        }

        info!("Copying {} into {}", source_path, self.settings.namespace);

        let result = self.copy_into_store(source_path, limits);
        if let Err(e) = &result {
            error!("Failed to save {}: {}", source_path, e);
        }
        result
    }

    /// Boundary form of [`IngestService::ingest`]: every failure becomes `None`
    pub fn save_file(&self, source_path: &str, limits: &IngestLimits) -> Option<Locator> {
        let outcome = IngestOutcome::from(self.ingest(source_path, limits));
        if let IngestOutcome::Skipped(reason) = &outcome {
            debug!("Skipped saving {}: {}", source_path, reason);
        }
        outcome.into_locator()
    }

    fn copy_into_store(
        &self,
        source_path: &str,
        limits: &IngestLimits,
    ) -> Result<StorageEntry, IngestError> {
        let unreadable = |source: std::io::Error| IngestError::SourceUnreadable {
            path: source_path.to_string(),
            source,
        };

        let mime_type = mime_type_for_path(source_path);

        let mut source = File::open(source_path).map_err(unreadable)?;
        let source_len = source.metadata().map_err(unreadable)?.len();
        if source_len > limits.max_file_size_bytes {
            return Err(IngestError::StorageRejected(StorageError::FileTooLarge {
                size: source_len,
                limit: limits.max_file_size_bytes,
            }));
        }

        let display_name = Uuid::new_v4().to_string();
        let new_entry = NewEntry {
            title: self.settings.include_title.then(|| display_name.clone()),
            display_name,
            mime_type,
            relative_namespace: self.settings.namespace.clone(),
        };

        let entry = self.store.insert(&new_entry)?;

        let copied = self
            .stream_contents(&mut source, &entry.locator, source_path, limits)
            .and_then(|total_bytes| {
                self.store
                    .publish(&entry.locator, total_bytes)
                    .map_err(IngestError::from)
            });

        match copied {
            Ok(published) => Ok(published),
            Err(e) => {
                if limits.cleanup_partial_entries {
                    if let Err(cleanup) = self.store.delete(&entry.locator) {
                        warn!(
                            "Failed to remove partial entry {}: {}",
                            entry.locator, cleanup
                        );
                    }
                }
                Err(e)
            }
        }
    }

    /// Streams the source into the entry and flushes it. Returns bytes written.
    fn stream_contents(
        &self,
        source: &mut File,
        locator: &Locator,
        source_path: &str,
        limits: &IngestLimits,
    ) -> Result<u64, IngestError> {
        let mut writer = self.store.open_writer(locator)?;
        let mut buffer = vec![0u8; self.settings.buffer_size.max(1)];
        let mut total_bytes = 0u64;

        loop {
            let n = match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(IngestError::SourceUnreadable {
                        path: source_path.to_string(),
                        source: e,
                    });
                }
            };

            // The source may grow after the up-front size check
            total_bytes += n as u64;
            if total_bytes > limits.max_file_size_bytes {
                return Err(IngestError::StorageRejected(StorageError::FileTooLarge {
                    size: total_bytes,
                    limit: limits.max_file_size_bytes,
                }));
            }

            writer
                .write_all(&buffer[..n])
                .map_err(|e| IngestError::StorageRejected(StorageError::from(e)))?;
        }

        writer
            .flush()
            .map_err(|e| IngestError::StorageRejected(StorageError::from(e)))?;

        Ok(total_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::StaticGate;
    use crate::storage::FsMediaStore;
    use std::io;
    use tempfile::TempDir;

    const NAMESPACE: &str = "Music/AppName";

    fn service(root: &TempDir, gate: StaticGate, api_level: u32) -> IngestService {
        let store = FsMediaStore::new(&root.path().join("shared")).unwrap();
        IngestService::new(
            Arc::new(store),
            Arc::new(gate),
            Capabilities::resolve(api_level),
            IngestSettings {
                namespace: NAMESPACE.into(),
                include_title: true,
                buffer_size: 4,
            },
        )
    }

    fn write_source(dir: &TempDir, name: &str, contents: &[u8]) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().to_string()
    }

    fn read_entry(service: &IngestService, locator: &Locator) -> Vec<u8> {
        let mut contents = Vec::new();
        service
            .store()
            .open_reader(locator)
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        contents
    }

    #[test]
    fn copies_bytes_and_classifies_mp3() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, StaticGate::granted(), 33);
        let source = write_source(&dir, "track.mp3", b"ID3 not really audio");

        let entry = service.ingest(&source, &IngestLimits::default()).unwrap();

        assert_eq!(entry.mime_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(entry.relative_namespace, NAMESPACE);
        assert_eq!(entry.title.as_deref(), Some(entry.display_name.as_str()));
        assert_eq!(entry.size_bytes, 20);
        assert!(!entry.pending);
        assert!(Uuid::parse_str(&entry.display_name).is_ok());
        assert_eq!(read_entry(&service, &entry.locator), b"ID3 not really audio");
    }

    #[test]
    fn title_omitted_when_disabled() {
        let dir = TempDir::new().unwrap();
        let store = FsMediaStore::new(&dir.path().join("shared")).unwrap();
        let service = IngestService::new(
            Arc::new(store),
            Arc::new(StaticGate::granted()),
            Capabilities::resolve(33),
            IngestSettings {
                include_title: false,
                ..IngestSettings::default()
            },
        );
        let source = write_source(&dir, "notes.txt", b"abc");

        let entry = service.ingest(&source, &IngestLimits::default()).unwrap();
        assert!(entry.title.is_none());
        assert_eq!(entry.mime_type.as_deref(), Some("text/plain"));
    }

    #[test]
    fn unknown_extension_still_ingested() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, StaticGate::granted(), 33);
        let source = write_source(&dir, "capture.zzqx", b"raw");

        let entry = service.ingest(&source, &IngestLimits::default()).unwrap();
        assert!(entry.mime_type.is_none());
        assert_eq!(read_entry(&service, &entry.locator), b"raw");
    }

    #[test]
    fn denied_permission_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, StaticGate::denied(), 33);
        let source = write_source(&dir, "track.mp3", b"data");

        let err = service.ingest(&source, &IngestLimits::default()).unwrap_err();
        assert!(matches!(err, IngestError::PermissionDenied));
        assert!(service.save_file(&source, &IngestLimits::default()).is_none());
        assert!(service.store().list(NAMESPACE).unwrap().is_empty());
    }

    #[test]
    fn old_platform_is_a_no_op_even_when_granted() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, StaticGate::granted(), 28);
        let source = write_source(&dir, "track.mp3", b"data");

        let err = service.ingest(&source, &IngestLimits::default()).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedPlatform { api_level: 28 }));
        assert!(service.save_file(&source, &IngestLimits::default()).is_none());
        assert!(service.store().list(NAMESPACE).unwrap().is_empty());
    }

    #[test]
    fn missing_source_returns_none_and_leaves_no_entry() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, StaticGate::granted(), 33);
        let missing = dir.path().join("nope.mp3").to_string_lossy().to_string();

        let err = service.ingest(&missing, &IngestLimits::default()).unwrap_err();
        assert!(matches!(err, IngestError::SourceUnreadable { .. }));
        assert!(service.save_file(&missing, &IngestLimits::default()).is_none());
        assert!(service.store().list(NAMESPACE).unwrap().is_empty());
    }

    #[test]
    fn same_source_twice_gives_distinct_locators() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, StaticGate::granted(), 33);
        let source = write_source(&dir, "track.mp3", b"data");
        let limits = IngestLimits::default();

        let first = service.save_file(&source, &limits).unwrap();
        let second = service.save_file(&source, &limits).unwrap();

        assert_ne!(first, second);
        assert_eq!(service.store().list(NAMESPACE).unwrap().len(), 2);
        assert_eq!(read_entry(&service, &first), read_entry(&service, &second));
    }

    #[test]
    fn oversized_source_is_rejected_before_insert() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, StaticGate::granted(), 33);
        let source = write_source(&dir, "big.bin", &[7u8; 64]);
        let limits = IngestLimits {
            max_file_size_bytes: 16,
            cleanup_partial_entries: true,
        };

        let err = service.ingest(&source, &limits).unwrap_err();
        assert!(matches!(
            err,
            IngestError::StorageRejected(StorageError::FileTooLarge { size: 64, limit: 16 })
        ));
        assert!(service.store().list(NAMESPACE).unwrap().is_empty());
    }

    /// Store whose writers fail once `fail_after` bytes have been written
    struct FailingStore {
        inner: FsMediaStore,
        fail_after: usize,
        fail_publish: bool,
    }

    struct FailingWriter {
        remaining: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.len() > self.remaining {
                return Err(io::Error::other("disk full"));
            }
            self.remaining -= buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl MediaStore for FailingStore {
        fn insert(&self, entry: &NewEntry) -> Result<StorageEntry, StorageError> {
            self.inner.insert(entry)
        }

        fn open_writer(&self, _locator: &Locator) -> Result<Box<dyn Write + Send>, StorageError> {
            Ok(Box::new(FailingWriter {
                remaining: self.fail_after,
            }))
        }

        fn publish(&self, locator: &Locator, size: u64) -> Result<StorageEntry, StorageError> {
            if self.fail_publish {
                return Err(StorageError::IoError(io::Error::other("metadata volume read-only")));
            }
            self.inner.publish(locator, size)
        }

        fn open_reader(&self, locator: &Locator) -> Result<Box<dyn Read + Send>, StorageError> {
            self.inner.open_reader(locator)
        }

        fn get(&self, locator: &Locator) -> Result<StorageEntry, StorageError> {
            self.inner.get(locator)
        }

        fn delete(&self, locator: &Locator) -> Result<(), StorageError> {
            self.inner.delete(locator)
        }

        fn list(&self, namespace: &str) -> Result<Vec<StorageEntry>, StorageError> {
            self.inner.list(namespace)
        }
    }

    fn failing_service(dir: &TempDir) -> IngestService {
        failing_service_with(FailingStore {
            inner: FsMediaStore::new(&dir.path().join("shared")).unwrap(),
            fail_after: 4,
            fail_publish: false,
        })
    }

    fn failing_service_with(store: FailingStore) -> IngestService {
        IngestService::new(
            Arc::new(store),
            Arc::new(StaticGate::granted()),
            Capabilities::resolve(33),
            IngestSettings {
                namespace: NAMESPACE.into(),
                include_title: true,
                buffer_size: 4,
            },
        )
    }

    #[test]
    fn failed_write_removes_partial_entry() {
        let dir = TempDir::new().unwrap();
        let service = failing_service(&dir);
        let source = write_source(&dir, "track.mp3", b"more than four bytes");

        let err = service.ingest(&source, &IngestLimits::default()).unwrap_err();
        assert!(matches!(err, IngestError::StorageRejected(StorageError::IoError(_))));
        assert!(service.store().list(NAMESPACE).unwrap().is_empty());
    }

    #[test]
    fn failed_write_keeps_pending_entry_without_cleanup() {
        let dir = TempDir::new().unwrap();
        let service = failing_service(&dir);
        let source = write_source(&dir, "track.mp3", b"more than four bytes");
        let limits = IngestLimits {
            cleanup_partial_entries: false,
            ..IngestLimits::default()
        };

        assert!(service.save_file(&source, &limits).is_none());
        let entries = service.store().list(NAMESPACE).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].pending);
    }

    #[test]
    fn failed_publish_removes_pending_entry() {
        let dir = TempDir::new().unwrap();
        let service = failing_service_with(FailingStore {
            inner: FsMediaStore::new(&dir.path().join("shared")).unwrap(),
            fail_after: usize::MAX,
            fail_publish: true,
        });
        let source = write_source(&dir, "track.mp3", b"complete copy");

        let err = service.ingest(&source, &IngestLimits::default()).unwrap_err();
        assert!(matches!(err, IngestError::StorageRejected(StorageError::IoError(_))));
        assert!(service.store().list(NAMESPACE).unwrap().is_empty());
    }
}
