use super::{StorageBackend, StorageError};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;
use std::sync::{Mutex, PoisonError};

/// Local storage persisted as one JSON object on disk.
///
/// Every operation reads the document, applies the change and writes it back
/// through a temporary sibling file that is renamed into place, so a crash
/// mid-write leaves the previous document intact. A process-local mutex
/// serializes read-modify-write cycles.
///
/// Reads report a damaged document as [`StorageError::Corrupt`]. Writes move
/// it aside to `<name>.corrupt` and start over from an empty document.
#[derive(Debug)]
pub struct FileStorage {
    path: Utf8PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a storage backed by `path`. Parent directories are created on first write.
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn load(&self) -> Result<IndexMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(IndexMap::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(IndexMap::new());
        }

        serde_json::from_str(&contents)
            .map_err(|e| StorageError::Corrupt(format!("{}: {}", self.path, e)))
    }

    /// Load for a read-modify-write cycle, discarding a damaged document.
    fn load_or_reset(&self) -> Result<IndexMap<String, String>, StorageError> {
        match self.load() {
            Err(StorageError::Corrupt(reason)) => {
                let aside = self.path.with_extension("corrupt");
                tracing::warn!(
                    "Discarding damaged storage document ({}), moving it to {}",
                    reason,
                    aside
                );
                fs::rename(&self.path, &aside)?;
                Ok(IndexMap::new())
            }
            other => other,
        }
    }

    fn store(&self, entries: &IndexMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let document = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, document)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn modify<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut IndexMap<String, String>),
    {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load_or_reset()?;
        change(&mut entries);
        self.store(&entries)
    }
}

impl StorageBackend for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.shift_remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|entries| {
            entries.shift_remove(key);
        })
    }

    fn wipe(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store(&IndexMap::new())
    }
}
