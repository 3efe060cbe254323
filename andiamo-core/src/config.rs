//! Client configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AndiamoError, AndiamoResult};

static DEFAULT_API_URL: &str = "http://localhost:8083";
static DEFAULT_STORE_PATH: &str = "~/.config/andiamo/session.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Configuration at ~/.config/andiamo/config.toml
///
/// Every key can be overridden from the environment with an `ANDIAMO_`
/// prefix, e.g. `ANDIAMO_API_URL`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AndiamoConfig {
    /// Backend base URL; endpoints live under `/api`
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where the session (token, role, profile) is kept
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// IANA zone used to decide calendar days; system zone when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AndiamoConfig {
    fn default() -> Self {
        AndiamoConfig {
            api_url: default_api_url(),
            store_path: default_store_path(),
            timezone: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AndiamoConfig {
    pub fn config_path() -> AndiamoResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AndiamoError::Config("Could not determine config directory".into()))?
            .join("andiamo");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, writing a commented default on first run.
    pub fn load() -> AndiamoResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> AndiamoResult<Self> {
        Self::load_with_env(path, Self::environment())
    }

    /// `ANDIAMO_*` variables, e.g. `ANDIAMO_TIMEOUT_SECS=10`.
    fn environment() -> Environment {
        Environment::with_prefix("ANDIAMO").try_parsing(true)
    }

    fn load_with_env(path: &Path, env: Environment) -> AndiamoResult<Self> {
        let config: AndiamoConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(env)
            .build()
            .map_err(|e| AndiamoError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AndiamoError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AndiamoResult<()> {
        self.api_url()?;
        self.zone()?;

        if self.timeout_secs == 0 {
            return Err(AndiamoError::Config("timeout_secs must be greater than 0".into()));
        }

        Ok(())
    }

    pub fn api_url(&self) -> AndiamoResult<Url> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| AndiamoError::Config(format!("Invalid api_url '{}': {e}", self.api_url)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(AndiamoError::Config(format!(
                "api_url must use http or https, got '{other}'"
            ))),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.store_path.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }

    /// Configured zone, or `None` to use the system zone.
    pub fn zone(&self) -> AndiamoResult<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|_| AndiamoError::Config(format!("Unknown timezone '{name}'")))
            })
            .transpose()
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AndiamoResult<()> {
        let contents = format!(
            "\
# andiamo configuration

# Backend base URL:
# api_url = \"{}\"

# Where the login session is stored:
# store_path = \"{}\"

# Zone used to group events by day (defaults to the system zone):
# timezone = \"Europe/Paris\"

# Request timeout in seconds:
# timeout_secs = {}
",
            DEFAULT_API_URL, DEFAULT_STORE_PATH, DEFAULT_TIMEOUT_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AndiamoError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AndiamoError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
