//! Submission client configuration.
//!
//! # Environment Variables
//!
//! All optional:
//! - `CZQT_RELAY_URL` - Inquiry endpoint (default: <http://127.0.0.1:3000/api/contact>)
//! - `CZQT_FALLBACK_RECIPIENT` - Address for the mail-client fallback (default: linda@czqttools.com)
//! - `CZQT_PIXEL_ENDPOINT` - Tracking pixel URL (default: the landing page's pixel)
//! - `CZQT_REQUEST_TIMEOUT_SECS` - Upper bound on the relay request (default: 10)

use std::time::Duration;

use czqt_core::DEFAULT_PIXEL_ENDPOINT;
use thiserror::Error;
use url::Url;

/// Default relay endpoint, the site binary on its default port.
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000/api/contact";

/// Default mail-client fallback recipient.
pub const DEFAULT_FALLBACK_RECIPIENT: &str = "linda@czqttools.com";

/// Route the client navigates to after a submission.
pub const DEFAULT_THANK_YOU_PATH: &str = "/thank-you";

/// Pause between showing the confirmation and navigating away.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(2);

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Submission client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Relay endpoint receiving the inquiry JSON
    pub relay_url: Url,
    /// Path handed to [`crate::Browser::navigate`] after submitting
    pub thank_you_path: String,
    /// Delay before navigating to the thank-you path
    pub redirect_delay: Duration,
    /// Recipient of the `mailto:` fallback
    pub fallback_recipient: String,
    /// Upper bound on the relay request
    pub request_timeout: Duration,
    /// Tracking pixel endpoint
    pub pixel_endpoint: Url,
}

impl ClientConfig {
    /// Settings for `relay_url` with every other value at its default.
    #[must_use]
    pub fn new(relay_url: Url, pixel_endpoint: Url) -> Self {
        Self {
            relay_url,
            thank_you_path: DEFAULT_THANK_YOU_PATH.to_string(),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            fallback_recipient: DEFAULT_FALLBACK_RECIPIENT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            pixel_endpoint,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, treating empty values as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let relay_url = parse_url(
            "CZQT_RELAY_URL",
            get("CZQT_RELAY_URL").as_deref().unwrap_or(DEFAULT_RELAY_URL),
        )?;
        let pixel_endpoint = parse_url(
            "CZQT_PIXEL_ENDPOINT",
            get("CZQT_PIXEL_ENDPOINT")
                .as_deref()
                .unwrap_or(DEFAULT_PIXEL_ENDPOINT),
        )?;
        let mut config = Self::new(relay_url, pixel_endpoint);

        if let Some(value) = get("CZQT_FALLBACK_RECIPIENT") {
            config.fallback_recipient = value;
        }
        if let Some(value) = get("CZQT_REQUEST_TIMEOUT_SECS") {
            let secs = value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "CZQT_REQUEST_TIMEOUT_SECS".to_string(),
                        format!("expected a positive number of seconds, got {value:?}"),
                    )
                })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
