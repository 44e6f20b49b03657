//! Persistence adapter and storage backends.
//!
//! The session store never talks to a storage medium directly. It goes through
//! [`PersistenceAdapter`], which JSON-encodes values, swallows backend failures
//! and reports them as `false`/`None`.
//!
//! # Backends
//!
//! - [`MemoryStorage`]: insertion-ordered in-memory map with an optional byte quota
//! - [`FileStorage`]: a single JSON document on disk, the native stand-in for local storage
//! - [`CookieJar`]: cookies with per-key expiry, `path=/` and `SameSite=Lax`
//!
//! New backends implement [`StorageBackend`]; nothing else in the crate needs to change.

pub mod cookie;
pub mod file;
pub mod memory;

pub use cookie::{
    Cookie, CookieJar, CookieRetention, MAX_COOKIE_DAYS, SameSite, parse_cookie,
};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::metrics::SessionMetrics;
use crate::models::{CookieSettings, StorageBackendKind, StorageSettings};
use camino::Utf8Path;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Key holding the JSON-encoded authenticated user.
pub const USER_KEY: &str = "user";
/// Key holding the JSON-encoded theme.
pub const THEME_KEY: &str = "theme";
/// Key holding the JSON-encoded language.
pub const LANGUAGE_KEY: &str = "language";
/// Key holding the auth token returned at sign-in.
pub const TOKEN_KEY: &str = "token";

/// Failures a storage backend can report. These never leave the adapter.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded writing '{key}': {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("Storage is disabled")]
    Disabled,

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage document is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

/// Text key/value medium behind the persistence adapter.
///
/// Implementations must be usable from any thread; each call is synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait StorageBackend: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn delete(&self, key: &str) -> Result<(), StorageError>;

    fn wipe(&self) -> Result<(), StorageError>;
}

/// Build the backend selected in configuration.
///
/// `file_path` is the already-resolved location of the file backend's document.
pub fn open_backend(
    settings: &StorageSettings,
    cookies: &CookieSettings,
    file_path: &Utf8Path,
) -> Arc<dyn StorageBackend> {
    let backend: Arc<dyn StorageBackend> = match settings.backend {
        StorageBackendKind::Memory => Arc::new(match settings.quota_bytes {
            Some(quota) => MemoryStorage::with_quota(quota),
            None => MemoryStorage::new(),
        }),
        StorageBackendKind::File => Arc::new(FileStorage::new(file_path)),
        StorageBackendKind::Cookie => Arc::new(CookieJar::with_retention(
            CookieRetention {
                session_days: cookies.session_days,
                preference_days: cookies.preference_days,
            }
            .bounded(),
        )),
    };

    tracing::info!("Using {} storage", backend.name());
    backend
}

/// JSON persistence over a [`StorageBackend`] that never returns an error.
///
/// - [`get`](Self::get) yields `None` for missing keys, backend failures and
///   values that do not parse as `T`
/// - [`set`](Self::set), [`remove`](Self::remove) and [`clear`](Self::clear)
///   return `false` on any failure
///
/// Failures are logged with `tracing::warn!` and counted in [`SessionMetrics`].
#[derive(Clone)]
pub struct PersistenceAdapter {
    backend: Arc<dyn StorageBackend>,
    metrics: Arc<SessionMetrics>,
}

impl PersistenceAdapter {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_metrics(backend, Arc::new(SessionMetrics::new()))
    }

    pub fn with_metrics(backend: Arc<dyn StorageBackend>, metrics: Arc<SessionMetrics>) -> Self {
        Self { backend, metrics }
    }

    /// Read and decode a value.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable value for '{}' in {} storage: {}",
                    key,
                    self.backend.name(),
                    e
                );
                self.metrics.record_persist_failure();
                None
            }
        }
    }

    /// Read the stored text without decoding it.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        match self.backend.read(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Error reading '{}' from {} storage: {}", key, self.backend.name(), e);
                self.metrics.record_persist_failure();
                None
            }
        }
    }

    /// Encode and write a value. Returns `false` if either step fails.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(|source| StorageError::Serialize {
                key: key.to_string(),
                source,
            })
            .and_then(|encoded| self.backend.write(key, &encoded));

        self.settle("writing", key, result)
    }

    pub fn remove(&self, key: &str) -> bool {
        let result = self.backend.delete(key);
        self.settle("removing", key, result)
    }

    pub fn clear(&self) -> bool {
        let result = self.backend.wipe();
        self.settle("clearing", "*", result)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn settle(&self, verb: &str, key: &str, result: Result<(), StorageError>) -> bool {
        match result {
            Ok(()) => {
                self.metrics.record_persist_write();
                tracing::trace!("Storage {} '{}' succeeded", verb, key);
                true
            }
            Err(e) => {
                tracing::warn!("Error {} '{}' in {} storage: {}", verb, key, self.backend.name(), e);
                self.metrics.record_persist_failure();
                false
            }
        }
    }
}

impl fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("backend", &self.backend.name())
            .finish()
    }
}
