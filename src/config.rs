//! Layered configuration.
//!
//! Precedence, lowest first: built-in defaults, the TOML file, environment
//! variables, command-line flags. The last two are resolved by clap and
//! applied through [`Config::apply_overrides`].

use crate::error::{Error, IoError, Result};
use crate::hint::ClueLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default session database path.
pub const DEFAULT_DB_PATH: &str = ".cluekit/session.db";

/// Config file read when none is named explicitly and it exists.
pub const DEFAULT_CONFIG_PATH: &str = ".cluekit/config.toml";

/// Default address of the local proxy.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8787";

/// Default endpoint the hint client posts to (the local proxy).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8787/v1/generate";

/// Default upstream generation endpoint used by the proxy.
pub const DEFAULT_UPSTREAM: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// URL the hint client posts to.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Session database path.
    pub db_path: PathBuf,
    /// Level used when nothing is saved.
    pub default_level: ClueLevel,
    /// Proxy settings.
    pub proxy: ProxyConfig,
}

/// Settings of `cluekit serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    /// Socket address to listen on.
    pub listen: String,
    /// Upstream generation endpoint.
    pub upstream: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            default_level: ClueLevel::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            upstream: DEFAULT_UPSTREAM.to_string(),
        }
    }
}

/// Values resolved by the command line (flags or their environment
/// variables). `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Session database path.
    pub db_path: Option<PathBuf>,
    /// Hint endpoint.
    pub endpoint: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on invalid TOML or unknown keys.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file layer.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// read when present and defaults are used otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(IoError::FileNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|e| IoError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text)
    }

    /// Applies the environment and flag layer.
    #[must_use]
    pub fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(db_path) = overrides.db_path {
            self.db_path = db_path;
        }
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        self
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Config {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.endpoint.trim().is_empty() {
            return Err(Error::Config {
                message: "endpoint must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
