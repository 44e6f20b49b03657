use crate::storage::cookie::{MAX_COOKIE_DAYS, PREFERENCE_COOKIE_DAYS, SESSION_COOKIE_DAYS};
use serde::{Deserialize, Serialize};

/// Application configuration from `schooldesk.yaml`
///
/// Every section has defaults, so an empty or missing file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
}

/// External HTTP API consumed by the sign-in and list screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl ApiSettings {
    /// Root of the API endpoints: `<base_url>/api`.
    pub fn endpoint(&self) -> String {
        format!("{}/api", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Memory,
    #[default]
    File,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackendKind,
    /// Storage document for the file backend, relative to the config directory.
    pub path: String,
    /// Byte limit for the memory backend.
    pub quota_bytes: Option<usize>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::File,
            path: "local-storage.json".to_string(),
            quota_bytes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    /// Lifetime of the `user` and `token` cookies.
    pub session_days: u32,
    /// Lifetime of the `theme` and `language` cookies.
    pub preference_days: u32,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            session_days: SESSION_COOKIE_DAYS,
            preference_days: PREFERENCE_COOKIE_DAYS,
        }
    }
}

impl CookieSettings {
    /// Cap both lifetimes at [`MAX_COOKIE_DAYS`]. Returns `true` if either was lowered.
    pub fn clamp_retention(&mut self) -> bool {
        let before = (self.session_days, self.preference_days);
        self.session_days = self.session_days.min(MAX_COOKIE_DAYS);
        self.preference_days = self.preference_days.min(MAX_COOKIE_DAYS);
        before != (self.session_days, self.preference_days)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: String,
    pub prefix: String,
    pub debug: bool,
    pub console: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            prefix: "schooldesk".to_string(),
            debug: false,
            console: true,
        }
    }
}
