//! Client configuration.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use session_gateway::{GatewayConfig, DEFAULT_RENEWAL_PATH, DEFAULT_SIGN_IN_PATH};
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default backend URL (can be overridden at compile time via PANTRY_BACKEND_URL env var).
pub const DEFAULT_BACKEND_URL: &str = match option_env!("PANTRY_BACKEND_URL") {
    Some(url) => url,
    None => "http://localhost:8080",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DEFAULT_API_PREFIX: &str = "/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Main client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Backend origin, without the API prefix.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Prefix every API path lives under.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Session renewal endpoint, relative to the API prefix.
    #[serde(default = "default_renewal_path")]
    pub renewal_path: String,
    /// Sign-in entry point the user is sent to after a session loss.
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_renewal_path() -> String {
    DEFAULT_RENEWAL_PATH.to_string()
}

fn default_sign_in_path() -> String {
    DEFAULT_SIGN_IN_PATH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            backend_url: default_backend_url(),
            api_prefix: default_api_prefix(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            renewal_path: default_renewal_path(),
            sign_in_path: default_sign_in_path(),
        }
    }
}

impl Config {
    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            debug!(path = %config_path.display(), "Loading config file");
            Self::load_from_file(&config_path)?
        } else {
            debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(backend_url) = std::env::var("PANTRY_BACKEND_URL") {
            if !backend_url.trim().is_empty() {
                self.backend_url = backend_url.trim().to_string();
            }
        }
        if let Ok(log_level) = std::env::var("PANTRY_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    /// Base URL every API path is appended to (backend URL + API prefix).
    pub fn api_base_url(&self) -> CoreResult<Url> {
        let origin = self.backend_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        let joined = if prefix.is_empty() {
            origin.to_string()
        } else {
            format!("{}/{}", origin, prefix)
        };

        let url = Url::parse(&joined)?;
        if url.cannot_be_a_base() {
            return Err(CoreError::Config(format!(
                "backend_url is not a valid base URL: {}",
                self.backend_url
            )));
        }
        Ok(url)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Gateway settings derived from this configuration.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            renewal_path: self.renewal_path.clone(),
            sign_in_path: self.sign_in_path.clone(),
        }
    }
}
