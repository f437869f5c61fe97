//! Filesystem media store
//!
//! Stores each entry as a plain file under `<root>/<namespace>/<name>` with a
//! JSON metadata sidecar at `<root>/<namespace>/.meta/<name>.json`.

use log::{debug, error, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::StorageError;
use crate::storage::results::{Locator, NewEntry, StorageEntry};
use crate::storage::store::MediaStore;
use crate::storage::validation::{is_relative_namespace, is_safe_entry_name};

const META_DIR: &str = ".meta";
const MAX_RETRIES: usize = 3;

#[derive(Debug)]
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    /// Opens a store rooted at `root`, creating the directory if needed
    pub fn new(root: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(root)?;
        info!("Media store root: {}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: &str) -> Result<PathBuf, StorageError> {
        if !is_relative_namespace(namespace) {
            return Err(StorageError::InvalidNamespace(namespace.to_string()));
        }
        Ok(self.root.join(namespace))
    }

    fn data_path(&self, locator: &Locator) -> Result<PathBuf, StorageError> {
        if !is_safe_entry_name(locator.display_name()) {
            return Err(StorageError::InvalidLocator(locator.to_string()));
        }
        Ok(self
            .namespace_dir(locator.namespace())?
            .join(locator.display_name()))
    }

    fn meta_path(&self, locator: &Locator) -> Result<PathBuf, StorageError> {
        if !is_safe_entry_name(locator.display_name()) {
            return Err(StorageError::InvalidLocator(locator.to_string()));
        }
        Ok(self
            .namespace_dir(locator.namespace())?
            .join(META_DIR)
            .join(format!("{}.json", locator.display_name())))
    }

    fn read_meta(&self, locator: &Locator) -> Result<StorageEntry, StorageError> {
        let meta_path = self.meta_path(locator)?;
        let raw = fs::read(&meta_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::EntryNotFound(locator.to_string()),
            _ => StorageError::from(e),
        })?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Writes metadata through a temporary file so readers never see half a record
    fn write_meta(&self, entry: &StorageEntry) -> Result<(), StorageError> {
        let meta_path = self.meta_path(&entry.locator)?;
        let temp_path = meta_path.with_extension("json.tmp");

        let json = serde_json::to_vec_pretty(entry)?;
        fs::write(&temp_path, json)?;

        if let Err(e) = fs::rename(&temp_path, &meta_path) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                warn!(
                    "Failed to remove temporary metadata {}: {}",
                    temp_path.display(),
                    cleanup
                );
            }
            return Err(StorageError::from(e));
        }
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|dur| dur.as_secs())
        .unwrap_or(0)
}

/// Removes a file, retrying briefly when the OS reports it busy
fn remove_with_retries(path: &Path) -> std::io::Result<()> {
    for attempt in 1..=MAX_RETRIES {
        match fs::remove_file(path) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < MAX_RETRIES && e.kind() == ErrorKind::PermissionDenied => {
                thread::sleep(Duration::from_millis(100 * attempt as u64));
            }
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::other("Failed to remove file after retries"))
}

impl MediaStore for FsMediaStore {
    fn insert(&self, new_entry: &NewEntry) -> Result<StorageEntry, StorageError> {
        if !is_safe_entry_name(&new_entry.display_name) {
            return Err(StorageError::InvalidLocator(new_entry.display_name.clone()));
        }

        let namespace_dir = self.namespace_dir(&new_entry.relative_namespace)?;
        fs::create_dir_all(namespace_dir.join(META_DIR))?;

        let locator = Locator::new(&new_entry.relative_namespace, &new_entry.display_name);
        let data_path = self.data_path(&locator)?;

        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&data_path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    StorageError::EntryAlreadyExists(new_entry.display_name.clone())
                }
                _ => StorageError::from(e),
            })?;

        let entry = StorageEntry {
            display_name: new_entry.display_name.clone(),
            title: new_entry.title.clone(),
            mime_type: new_entry.mime_type.clone(),
            relative_namespace: locator.namespace().to_string(),
            locator,
            size_bytes: 0,
            created_at: unix_now(),
            pending: true,
        };

        if let Err(e) = self.write_meta(&entry) {
            error!(
                "Failed to record metadata for {} (real: {}): {}",
                entry.locator,
                data_path.display(),
                e
            );
            if let Err(cleanup) = fs::remove_file(&data_path) {
                warn!(
                    "Failed to remove orphaned data file {}: {}",
                    data_path.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        debug!("Inserted entry {} (real: {})", entry.locator, data_path.display());
        Ok(entry)
    }

    fn open_writer(&self, locator: &Locator) -> Result<Box<dyn Write + Send>, StorageError> {
        let data_path = self.data_path(locator)?;
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&data_path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::EntryNotFound(locator.to_string()),
                _ => StorageError::from(e),
            })?;
        Ok(Box::new(file))
    }

    fn publish(&self, locator: &Locator, size_bytes: u64) -> Result<StorageEntry, StorageError> {
        let mut entry = self.read_meta(locator)?;
        entry.size_bytes = size_bytes;
        entry.pending = false;
        self.write_meta(&entry)?;

        info!("Published entry {} ({} bytes)", locator, size_bytes);
        Ok(entry)
    }

    fn open_reader(&self, locator: &Locator) -> Result<Box<dyn Read + Send>, StorageError> {
        if self.read_meta(locator)?.pending {
            return Err(StorageError::EntryPending(locator.to_string()));
        }

        let data_path = self.data_path(locator)?;
        let file = File::open(&data_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::EntryNotFound(locator.to_string()),
            _ => StorageError::from(e),
        })?;
        Ok(Box::new(file))
    }

    fn get(&self, locator: &Locator) -> Result<StorageEntry, StorageError> {
        self.read_meta(locator)
    }

    fn delete(&self, locator: &Locator) -> Result<(), StorageError> {
        let data_path = self.data_path(locator)?;
        let meta_path = self.meta_path(locator)?;

        if !data_path.exists() && !meta_path.exists() {
            return Err(StorageError::EntryNotFound(locator.to_string()));
        }

        for path in [&data_path, &meta_path] {
            match remove_with_retries(path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    error!(
                        "Failed to delete {} (real: {}): {}",
                        locator,
                        path.display(),
                        e
                    );
                    return Err(StorageError::from(e));
                }
            }
        }

        info!("Deleted entry {}", locator);
        Ok(())
    }

    fn list(&self, namespace: &str) -> Result<Vec<StorageEntry>, StorageError> {
        let meta_dir = self.namespace_dir(namespace)?.join(META_DIR);

        let dir = match fs::read_dir(&meta_dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::from(e)),
        };

        let mut entries = Vec::new();
        for item in dir.flatten() {
            let path = item.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let raw = fs::read(&path)?;
            entries.push(serde_json::from_slice::<StorageEntry>(&raw)?);
        }

        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        Ok(entries)
    }
}
