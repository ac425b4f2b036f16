// docmongo-core/src/config.rs
// Connection configuration: TOML file or environment (.env supported)

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::error::{DocMongoError, Result};
use crate::logging::LogLevel;

/// Default per-operation timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable pointing at a TOML config file
pub const CONFIG_PATH_VAR: &str = "DOCMONGO_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "docmongo.toml";

const URI_VARS: [&str; 2] = ["MongoURI", "MONGO_URI"];
const TIMEOUT_VAR: &str = "MONGO_TIMEOUT_SECS";
const LOG_VAR: &str = "DOCMONGO_LOG";

/// Everything needed to open a `DocStore`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// `mongodb://host[:port]/<database>[?options]`
    pub uri: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ConnectionConfig {
    pub fn new(uri: impl Into<String>, timeout_secs: u64) -> Self {
        ConnectionConfig {
            uri: uri.into(),
            timeout_secs,
            log_level: None,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ConnectionConfig = toml::from_str(content)
            .map_err(|e| DocMongoError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocMongoError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Read from the process environment, loading `.env` first if present
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let uri = URI_VARS
            .iter()
            .find_map(|name| lookup(name))
            .ok_or_else(|| {
                DocMongoError::Config(format!("none of {:?} is set", URI_VARS))
            })?;

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                DocMongoError::Config(format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_VAR, raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = ConnectionConfig {
            uri,
            timeout_secs,
            log_level: lookup(LOG_VAR),
        };
        config.validate()?;
        Ok(config)
    }

    /// `$DOCMONGO_CONFIG` or `docmongo.toml` when it exists, else the environment
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            warn!(path = %config_path, "Config file not found, reading environment");
            Self::from_env()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured log level, falling back to the default on absent or bad input
    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(LogLevel::from_str)
            .unwrap_or_default()
    }

    fn validate(&self) -> Result<()> {
        if self.uri.trim().is_empty() {
            return Err(DocMongoError::Config("uri must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(DocMongoError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
