//! Data models for the SchoolDesk session core.
//!
//! - [`Session`]: the central state container (user, loading, error, theme, language, sidebar)
//! - [`User`] and [`Role`]: the authenticated identity, with a closed role set plus `Unknown`
//! - [`ThemeConfig`], [`ThemePatch`] and [`LanguageConfig`]: preferences that survive logout
//! - [`AppConfig`]: API, storage, cookie and logging settings loaded from `schooldesk.yaml`
//!
//! # Architecture Note
//!
//! The persisted models derive `Serialize`/`Deserialize` with camelCase field
//! names, so values written by the web client hydrate unchanged. `Session` itself is never persisted as a whole; the store writes
//! individual keys.

pub mod config;
pub mod preferences;
pub mod session;
pub mod user;

pub use config::{
    ApiSettings, AppConfig, CookieSettings, LoggingSettings, StorageBackendKind, StorageSettings,
};
pub use preferences::{
    DEFAULT_PRIMARY_COLOR, LanguageConfig, Scale, ThemeConfig, ThemeMode, ThemePatch,
    available_languages,
};
pub use session::Session;
pub use user::{Role, User};
