#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::utils::error::{MegaOptimError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.megaoptim.com/v1/";
pub const API_KEY_HEADER: &str = "X-API-KEY";
pub const API_KEY_ENV: &str = "MEGAOPTIM_API_KEY";
pub const BASE_URL_ENV: &str = "MEGAOPTIM_BASE_URL";

pub fn default_user_agent() -> String {
    format!("MegaOptim Rust Client v{}", env!("CARGO_PKG_VERSION"))
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Client-level settings, fixed once a client is constructed.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub http_timeout_seconds: Option<u64>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            http_timeout_seconds: None,
        }
    }

    /// Reads `MEGAOPTIM_API_KEY` (required) and `MEGAOPTIM_BASE_URL` (optional).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| MegaOptimError::ConfigError {
            message: format!("{} environment variable is required", API_KEY_ENV),
        })?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    /// Points the client at another deployment of the API, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = Some(seconds);
        self
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_seconds.map(Duration::from_secs)
    }

    pub fn optimize_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?.join("optimize")?)
    }

    /// `<optimize_url>/<process_id>/result?timeout=<seconds>`
    pub fn result_url(&self, process_id: &str, timeout_seconds: u64) -> Result<Url> {
        let mut url = self.optimize_url()?;
        url.path_segments_mut()
            .map_err(|_| MegaOptimError::ConfigError {
                message: format!("base_url cannot be a base: {}", self.base_url),
            })?
            .push(process_id)
            .push("result");
        url.query_pairs_mut()
            .append_pair("timeout", &timeout_seconds.to_string());
        Ok(url)
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            (API_KEY_HEADER.to_string(), self.api_key.clone()),
        ]
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("api_key", &self.api_key)?;
        validate_url("base_url", &self.base_url)?;
        validate_non_empty_string("user_agent", &self.user_agent)?;
        if self.http_timeout_seconds == Some(0) {
            return Err(MegaOptimError::InvalidConfigValueError {
                field: "http_timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
