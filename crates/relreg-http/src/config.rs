//! Server configuration.
//!
//! Layered as defaults, then an optional TOML file, then environment
//! variables. Command-line flags are applied last by the binary.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Default file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "relreg.toml";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown log format {0:?} (expected \"pretty\" or \"json\")")]
    LogFormat(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::LogFormat(s.to_string())),
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Upper bound on stored responses.
    pub max_entries: usize,
    /// Seconds a stored response stays valid.
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: false,
            max_entries: 200,
            ttl_secs: 3600,
        }
    }
}

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root of the registry data tree.
    pub root: PathBuf,
    pub port: u16,
    pub cache: CacheConfig,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            root: PathBuf::from("."),
            port: 3000,
            cache: CacheConfig::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ServerConfig::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(data: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data, path)
    }

    /// Load from an explicit file, or from `relreg.toml` if one exists,
    /// then apply the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => ServerConfig::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay variables from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Overlay variables from `lookup`. Blank values count as unset.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(root) = var("REGISTRY_ROOT") {
            self.root = PathBuf::from(root);
        }
        if let Some(port) = var("PORT") {
            self.port = parse_env("PORT", port, "a port number")?;
        }
        if let Some(flag) = var("REGISTRY_ENABLE_CACHE") {
            self.cache.enabled = flag == "1";
        } else if let Some(env) = var("REGISTRY_ENV") {
            self.cache.enabled = env == "production";
        }
        if let Some(max) = var("REGISTRY_CACHE_THRESHOLD") {
            self.cache.max_entries = parse_env("REGISTRY_CACHE_THRESHOLD", max, "an entry count")?;
        }
        if let Some(ttl) = var("REGISTRY_CACHE_TIMEOUT") {
            self.cache.ttl_secs = parse_env("REGISTRY_CACHE_TIMEOUT", ttl, "a number of seconds")?;
        }
        if let Some(format) = var("REGISTRY_LOG_FORMAT") {
            self.log_format = format.parse()?;
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(
    name: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnv {
            name,
            value,
            expected,
        })
}
