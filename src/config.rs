//! Client configuration
//!
//! Settings are read from a TOML file and then overridden from the
//! environment:
//!
//! ```toml
//! host = "akab-xxxx.luna.akamaiapis.net"
//! auth_header = "EG1-HMAC-SHA256 client_token=...;access_token=...;..."
//! request_timeout_secs = 30
//! log_level = "info"
//!
//! [poll]
//! interval_ms = 1000
//! timeout_secs = 600
//! ```
//!
//! | Variable            | Overrides              |
//! |---------------------|------------------------|
//! | `CONFIGDNS_HOST`    | `host`                 |
//! | `CONFIGDNS_AUTH`    | `auth_header`          |
//! | `CONFIGDNS_TIMEOUT` | `request_timeout_secs` |

use std::fs;
use std::path::Path;
use std::time::Duration;

use derive_more::{Display, Error, From};
use serde_derive::{Deserialize, Serialize};

use crate::dns::reconcile::PollPolicy;

pub const ENV_HOST: &str = "CONFIGDNS_HOST";
pub const ENV_AUTH: &str = "CONFIGDNS_AUTH";
pub const ENV_TIMEOUT: &str = "CONFIGDNS_TIMEOUT";

#[derive(Debug, Display, From, Error)]
pub enum ConfigError {
    #[display(fmt = "Unable to read config file: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "Invalid config file: {}", _0)]
    Parse(toml::de::Error),
    #[display(fmt = "Invalid configuration: {}", _0)]
    #[from(ignore)]
    #[error(ignore)]
    Invalid(String),
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Polling settings of the save protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub backoff_multiplier: f32,
    pub max_interval_ms: u64,
    pub max_polls: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        let policy = PollPolicy::default();
        Self {
            interval_ms: policy.interval.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
            max_interval_ms: policy.max_interval.as_millis() as u64,
            max_polls: policy.max_polls,
            timeout_secs: policy.timeout.map(|t| t.as_secs()),
        }
    }
}

/// Everything needed to talk to the zone API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API host, with or without scheme
    pub host: String,
    /// Complete value of the `Authorization` header
    pub auth_header: Option<String>,
    pub request_timeout_secs: u64,
    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,
    pub json_logs: bool,
    pub poll: PollConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            auth_header: None,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
            json_logs: false,
            poll: PollConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load from an optional file, apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> Result<ClientConfig> {
        let mut config = match path {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<ClientConfig> {
        let contents = fs::read_to_string(path)?;
        let config = ClientConfig::from_toml(&contents)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<ClientConfig> {
        Ok(toml::from_str(contents)?)
    }

    /// Override settings from variables found through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(auth) = lookup(ENV_AUTH) {
            self.auth_header = Some(auth);
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT) {
            self.request_timeout_secs = timeout.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{} must be a number of seconds, got {:?}", ENV_TIMEOUT, timeout))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host is required".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".to_string()));
        }
        if self.poll.backoff_multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "poll.backoff_multiplier must be at least 1.0, got {}",
                self.poll.backoff_multiplier
            )));
        }
        Ok(())
    }

    /// Host as a URL, `https://` unless a scheme is given
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll.interval_ms),
            backoff_multiplier: self.poll.backoff_multiplier,
            max_interval: Duration::from_millis(self.poll.max_interval_ms),
            max_polls: self.poll.max_polls,
            timeout: self.poll.timeout_secs.map(Duration::from_secs),
        }
    }
}
