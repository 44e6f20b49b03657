// SchoolDesk - Session, persistence and routing core for a school management dashboard
//
// This is the library crate containing the session store, storage backends,
// role-based routing and the navigation shell.
// The binary crate (main.rs) provides an interactive terminal entry point.

pub mod config;
pub mod forms;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod routing;
pub mod state;
pub mod storage;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::SessionMetrics;
pub use models::{AppConfig, LanguageConfig, Role, Session, ThemeConfig, User};
pub use routing::{Resolution, Router, View, routes_for_role};
pub use state::{Action, SessionChange, SessionStore};
pub use storage::{PersistenceAdapter, StorageBackend};
pub use ui::AppController;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
