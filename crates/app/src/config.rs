//! Server configuration
//!
//! Read from an optional TOML file, then overridden by `STUDYSPACE_*`
//! environment variables.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use studyspace_net::DEFAULT_PORT;

pub const ENV_BIND: &str = "STUDYSPACE_BIND";
pub const ENV_DB: &str = "STUDYSPACE_DB";
pub const ENV_LOG: &str = "STUDYSPACE_LOG";

const DATABASE_FILE: &str = "studyspace.db";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Could not determine data directory")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server listens on
    pub bind: SocketAddr,
    /// SQLite file; the platform data directory when unset
    pub database_path: Option<PathBuf>,
    /// Default tracing filter, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Insert the starter spaces into an empty database
    pub seed_spaces: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            database_path: None,
            log_level: "info".to_string(),
            seed_spaces: true,
        }
    }
}

impl Config {
    /// Load from `path` if given, then apply process environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from variables found by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BIND) {
            self.bind = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_BIND,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_DB).filter(|v| !v.is_empty()) {
            self.database_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log_level = value;
        }
        Ok(())
    }

    /// Resolved database file
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(DATABASE_FILE)),
        }
    }
}

fn data_dir() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("dev", "studyspace", "studyspace").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().to_path_buf())
}
