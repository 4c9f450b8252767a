//! Configuration loading and resolution
//!
//! Bootstrap configuration comes from a TOML file and can be overridden by
//! environment variables and command-line arguments. Priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (`SONOMAP_CONFIG`, `SONOMAP_BACKEND_URL`, `SONOMAP_PORT`)
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing or unreadable config file never aborts startup: a warning is
//! logged and compiled defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default HTTP port of the panel service
pub const DEFAULT_PORT: u16 = 5740;

/// Default base URL of the analysis backend
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Default path (relative to the backend URL) of the projection endpoint
pub const DEFAULT_PROJECTION_PATH: &str = "/embeddings/projection";

/// Default quiet period before a settled selection is analysed
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Environment variable naming an explicit config file
pub const ENV_CONFIG_PATH: &str = "SONOMAP_CONFIG";

/// Environment variable overriding the backend URL
pub const ENV_BACKEND_URL: &str = "SONOMAP_BACKEND_URL";

/// Environment variable overriding the service port
pub const ENV_PORT: &str = "SONOMAP_PORT";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the analysis backend (e.g. `http://127.0.0.1:8000`)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Path of the projection endpoint, appended to `backend_url`
    #[serde(default = "default_projection_path")]
    pub projection_path: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Selection quiet period in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Timeout applied to every backend request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Capacity of the panel event bus
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_projection_path() -> String {
    DEFAULT_PROJECTION_PATH.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_event_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            projection_path: default_projection_path(),
            port: default_port(),
            debounce_ms: default_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            event_capacity: default_event_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.backend_url.trim().is_empty() {
            return Err(Error::Config("backend_url must not be empty".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Command-line overrides applied on top of file and environment settings
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub backend_url: Option<String>,
}

/// Locate the platform config file, if one exists
///
/// Linux checks `~/.config/sonomap/config.toml` then `/etc/sonomap/config.toml`;
/// other platforms only check the user config directory.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("sonomap").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/sonomap/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the effective configuration
///
/// Never fails: file problems degrade to compiled defaults with a warning,
/// invalid environment values are ignored with a warning.
pub fn resolve_config(overrides: &ConfigOverrides) -> TomlConfig {
    let path = overrides
        .config_path
        .clone()
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from))
        .or_else(default_config_path);

    let mut config = match path {
        Some(path) => match TomlConfig::load(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{}; using compiled defaults", e);
                TomlConfig::default()
            }
        },
        None => {
            warn!("No config file found; using compiled defaults");
            TomlConfig::default()
        }
    };

    if let Ok(url) = std::env::var(ENV_BACKEND_URL) {
        if !url.trim().is_empty() {
            config.backend_url = url;
        }
    }

    if let Ok(port) = std::env::var(ENV_PORT) {
        match port.parse::<u16>() {
            Ok(port) => config.port = port,
            Err(_) => warn!("Ignoring invalid {}={:?}", ENV_PORT, port),
        }
    }

    if let Some(url) = &overrides.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(port) = overrides.port {
        config.port = port;
    }

    config
}

/// Runtime settings consumed by the panel core
#[derive(Debug, Clone)]
pub struct PanelSettings {
    /// Base URL of the analysis backend, without trailing slash
    pub backend_url: String,
    /// Projection endpoint path
    pub projection_path: String,
    /// Trailing-debounce quiet period for selection changes
    pub quiet_period: Duration,
    /// Per-request timeout for backend calls
    pub request_timeout: Duration,
    /// Event bus capacity
    pub event_capacity: usize,
}

impl From<&TomlConfig> for PanelSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            backend_url: config.backend_url.trim_end_matches('/').to_string(),
            projection_path: config.projection_path.clone(),
            quiet_period: Duration::from_millis(config.debounce_ms),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            event_capacity: config.event_capacity,
        }
    }
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self::from(&TomlConfig::default())
    }
}
