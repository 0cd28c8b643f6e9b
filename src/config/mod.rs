//! Client configuration (layered: code > env > config file > defaults).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::auth::retry::DEFAULT_POLL_INTERVAL;
use crate::error::{DeviceAuthError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_URL: &str = "DEVICE_AUTH_URL";
const ENV_SESSION_TOKEN: &str = "DEVICE_AUTH_SESSION_TOKEN";
const ENV_POLL_INTERVAL: &str = "DEVICE_AUTH_POLL_INTERVAL_SECS";

/// Connection settings for the backend.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use device_auth::config::ClientConfig;
///
/// let config = ClientConfig::new("https://coder.example.com")
///     .with_session_token("session")
///     .with_request_timeout(Duration::from_secs(10));
/// assert_eq!(config.base_url, "https://coder.example.com");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_token: Option<String>,
    /// Exchange delay when the backend does not advise an interval.
    pub fallback_interval: Duration,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("session_token", &self.session_token.as_ref().map(|_| ".."))
            .field("fallback_interval", &self.fallback_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_token: None,
            fallback_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_fallback_interval(mut self, interval: Duration) -> Self {
        self.fallback_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Default config file path (~/.device-auth/config.toml).
    pub fn default_config_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".device-auth"))
            .unwrap_or_else(|| PathBuf::from(".device-auth"))
            .join("config.toml")
    }

    /// Load the default config file, then apply environment overrides.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::load_from_path(Self::default_config_path())?
            .apply_env_with(|key| std::env::var(key).ok())
    }

    /// Load settings from a TOML file over the defaults.
    ///
    /// Returns the defaults if the file does not exist.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(DeviceAuthError::Io(err)),
        };
        let file: ConfigFile = toml::from_str(&raw)?;
        let mut config = Self::default();
        if let Some(url) = file.url {
            config = config.with_base_url(url);
        }
        config.session_token = file.session_token.or(config.session_token);
        if let Some(secs) = file.poll_interval_secs {
            config.fallback_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Apply overrides read through `lookup` (normally the process environment).
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self = self.with_base_url(url);
        }
        if let Some(token) = lookup(ENV_SESSION_TOKEN) {
            self.session_token = Some(token);
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                DeviceAuthError::Configuration(format!("{ENV_POLL_INTERVAL} must be seconds, got {raw:?}"))
            })?;
            self.fallback_interval = Duration::from_secs(secs);
        }
        Ok(self)
    }

    /// Join a path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    url: Option<String>,
    session_token: Option<String>,
    poll_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}
