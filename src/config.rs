//! Application configuration.
//!
//! Loaded from `config.toml` in the platform config directory. The backend
//! URL can be overridden with `LIFEQUEST_BACKEND_URL`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Environment variable overriding `api.base_url`.
pub const BACKEND_URL_ENV: &str = "LIFEQUEST_BACKEND_URL";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    #[serde(default = "default_version")]
    pub version: String,
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiSettings,
    /// Session identity and behaviour
    #[serde(default)]
    pub session: SessionSettings,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            api: ApiSettings::default(),
            session: SessionSettings::default(),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Backend base URL (without `/api`)
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Session identity and behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Telegram id used to address the API
    pub tg_id: Option<i64>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub language_code: String,
    /// Re-fetch progress from the server after each committed completion
    pub refresh_after_completion: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tg_id: None,
            username: None,
            first_name: None,
            language_code: "en".to_string(),
            refresh_after_completion: true,
        }
    }
}

/// Get the application config directory.
pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "lifequest", "LifeQuest")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Load configuration from the default location, applying env overrides.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let mut config = load_config_from(&get_config_path())?;
    apply_env_overrides(&mut config, std::env::var(BACKEND_URL_ENV).ok());
    Ok(config)
}

/// Load configuration from a file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Save configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save configuration to a file, creating parent directories.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Apply the backend URL override, ignoring blank values.
pub fn apply_env_overrides(config: &mut AppConfig, backend_url: Option<String>) {
    if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
        tracing::debug!("Backend URL overridden by {}", BACKEND_URL_ENV);
        config.api.base_url = url.trim().to_string();
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
