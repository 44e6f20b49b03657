use crate::models::AppConfig;
use crate::storage::cookie::MAX_COOKIE_DAYS;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the application configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "schooldesk.yaml";

/// Prefix of environment overrides, e.g. `SCHOOLDESK_API__BASE_URL`.
pub const ENV_PREFIX: &str = "SCHOOLDESK";

/// Configuration manager for loading and saving `schooldesk.yaml`.
///
/// Loading is layered with the `config` crate, later layers winning:
/// 1. Built-in defaults (`#[serde(default)]` on every section)
/// 2. `schooldesk.yaml` in the config directory, if present
/// 3. Environment variables prefixed `SCHOOLDESK_`, with `__` between
///    section and field (`SCHOOLDESK_STORAGE__BACKEND=cookie`)
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory holding `schooldesk.yaml` (created if missing)
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load the configuration with overrides from the process environment.
    pub fn load_config(&self) -> Result<AppConfig> {
        self.load_layered(None)
    }

    /// Load the configuration with overrides taken from `env` instead of the
    /// process environment. Keys use the same `SCHOOLDESK_` names.
    pub fn load_config_with_env(&self, env: config::Map<String, String>) -> Result<AppConfig> {
        self.load_layered(Some(env))
    }

    fn load_layered(&self, env: Option<config::Map<String, String>>) -> Result<AppConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let layered = config::Config::builder()
            .add_source(
                config::File::new(self.config_path.as_str(), config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let mut config: AppConfig = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        if config.cookies.clamp_retention() {
            tracing::warn!(
                "Cookie retention capped at {} days: session={}, preference={}",
                MAX_COOKIE_DAYS,
                config.cookies.session_days,
                config.cookies.preference_days
            );
        }

        tracing::info!(
            "Loaded config: storage={:?}, api={}",
            config.storage.backend,
            config.api.base_url
        );
        Ok(config)
    }

    /// Save the configuration file.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Location of the file storage document; relative paths resolve against
    /// the config directory.
    pub fn storage_path(&self, config: &AppConfig) -> Utf8PathBuf {
        let path = Utf8Path::new(&config.storage.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
