//! Bootstrap configuration loading
//!
//! Settings are resolved in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not fatal: the defaults apply and
//! `ServiceConfig::config_file` stays `None` so the caller can warn about it.
//! A config file that exists but does not parse is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "LRS_CONFIG";
/// Environment variable overriding the database path
pub const DATABASE_ENV_VAR: &str = "LRS_DATABASE";
/// Environment variable overriding the HTTP port
pub const PORT_ENV_VAR: &str = "LRS_PORT";

/// Configuration file as written on disk
///
/// Every field is optional; anything left out falls through to the compiled
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Interface the HTTP server binds to
    #[serde(default)]
    pub bind_address: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

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

fn default_log_level() -> String {
    "info".to_string()
}

/// Compiled fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join("lrs"))
            .unwrap_or_else(|| PathBuf::from("./lrs_data"));

        Self {
            database_path: data_dir.join("lrs.db"),
            bind_address: "127.0.0.1".to_string(),
            port: 5001,
            log_level: default_log_level(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub log_level: String,
    /// Config file the values were read from, if one was found
    pub config_file: Option<PathBuf>,
}

impl ServiceConfig {
    /// `host:port` string for the TCP listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Default location of the config file (`<config_dir>/lrs/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lrs").join("config.toml"))
}

/// Load a TOML config file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    Ok(Some(config))
}

/// Resolve the service configuration from all sources
pub fn resolve_config(cli: &CliOverrides) -> Result<ServiceConfig> {
    let defaults = CompiledDefaults::for_current_platform();

    let config_path = cli
        .config_file
        .clone()
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .or_else(default_config_path);

    let (file, config_file) = match config_path {
        Some(path) => match load_toml_config(&path)? {
            Some(config) => (config, Some(path)),
            None => (TomlConfig::default(), None),
        },
        None => (TomlConfig::default(), None),
    };

    let database_path = cli
        .database_path
        .clone()
        .or_else(|| std::env::var(DATABASE_ENV_VAR).ok().map(PathBuf::from))
        .or(file.database_path)
        .unwrap_or(defaults.database_path);

    let port = match cli.port {
        Some(port) => port,
        None => match std::env::var(PORT_ENV_VAR) {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| {
                Error::Config(format!("{} is not a valid port: {}", PORT_ENV_VAR, raw))
            })?,
            Err(_) => file.port.unwrap_or(defaults.port),
        },
    };

    Ok(ServiceConfig {
        database_path,
        bind_address: file.bind_address.unwrap_or(defaults.bind_address),
        port,
        log_level: file.logging.level,
        config_file,
    })
}
