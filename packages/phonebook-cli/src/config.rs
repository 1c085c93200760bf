//! Configuration I/O (YAML loading)
//!
//! Only the binary reads configuration. The storage crate is handed a path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SUPPORTED_VERSIONS: &[u32] = &[1];

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing version field in YAML
    #[error("Missing 'version' field in configuration file. Add 'version: 1' to the top of your YAML file.")]
    MissingVersion,

    /// Unsupported version
    #[error("Unsupported configuration version {found}. Supported versions: {}", supported.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "))]
    UnsupportedVersion { found: u32, supported: Vec<u32> },

    /// Unknown log level
    #[error("Unknown log level '{0}'. Valid levels: trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    /// IO error
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// YAML Schema v1
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    version: Option<u32>,

    database: Option<PathBuf>,

    log_level: Option<String>,
}

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Store location handed to the contact book
    pub database: PathBuf,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("contacts.db"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(yaml)?;

        match file.version {
            None => return Err(ConfigError::MissingVersion),
            Some(v) if !SUPPORTED_VERSIONS.contains(&v) => {
                return Err(ConfigError::UnsupportedVersion {
                    found: v,
                    supported: SUPPORTED_VERSIONS.to_vec(),
                })
            }
            Some(_) => {}
        }

        let defaults = Self::default();
        let log_level = file.log_level.unwrap_or(defaults.log_level);
        if !LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ConfigError::UnknownLogLevel(log_level));
        }

        Ok(Self {
            database: file.database.unwrap_or(defaults.database),
            log_level,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Config file if given, else defaults; `--db` wins over both.
    pub fn resolve(config_path: Option<&Path>, db_override: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(db) = db_override {
            config.database = db.to_path_buf();
        }
        Ok(config)
    }
}
