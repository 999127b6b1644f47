//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WEB3FORMS_ACCESS_KEY` - Access key for the email delivery provider
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_STATIC_DIR` - Directory with the built landing page to serve at `/`
//! - `SITE_CORS_ORIGIN` - Origin allowed to post inquiries cross-site
//! - `INQUIRY_RECIPIENT` - Sales contact that receives inquiries (default: linda@czqttools.com)
//! - `INQUIRY_FROM_NAME` - Sender name on notification emails (default: CZQT Tools Website)
//! - `INQUIRY_FROM_EMAIL` - Sender address on notification emails (default: noreply@czqttools.com)
//! - `WEB3FORMS_ENDPOINT` - Provider submit URL (default: <https://api.web3forms.com/submit>)
//! - `EMAIL_TIMEOUT_SECS` - Upper bound on one provider call (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)
//! - `LOG_FORMAT` - `json` for JSON log lines (read by the binary)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default sales contact for inquiries.
pub const DEFAULT_RECIPIENT: &str = "linda@czqttools.com";

/// Default email provider endpoint.
pub const DEFAULT_PROVIDER_ENDPOINT: &str = "https://api.web3forms.com/submit";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Built landing page served as the fallback service
    pub static_dir: Option<PathBuf>,
    /// Origin allowed to call the inquiry endpoint from another site
    pub cors_origin: Option<String>,
    /// Inquiry relay configuration
    pub relay: RelayConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

/// Fixed relay settings injected into the inquiry relay.
///
/// Implements `Debug` manually to redact the provider credential.
#[derive(Clone)]
pub struct RelayConfig {
    /// Address that receives every inquiry
    pub recipient: String,
    /// Sender name on notification emails
    pub from_name: String,
    /// Sender address on notification emails
    pub from_email: String,
    /// Provider access credential
    pub access_key: SecretString,
    /// Provider submit endpoint
    pub provider_endpoint: Url,
    /// Upper bound on a single provider call
    pub delivery_timeout: Duration,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("recipient", &self.recipient)
            .field("from_name", &self.from_name)
            .field("from_email", &self.from_email)
            .field("access_key", &"[REDACTED]")
            .field("provider_endpoint", &self.provider_endpoint.as_str())
            .field("delivery_timeout", &self.delivery_timeout)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the provider credential fails validation (placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("SITE_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("SITE_PORT", "3000")?;
        let static_dir = get_optional_env("SITE_STATIC_DIR").map(PathBuf::from);
        let cors_origin = get_optional_env("SITE_CORS_ORIGIN");
        let relay = RelayConfig::from_env()?;

        Ok(Self {
            host,
            port,
            static_dir,
            cors_origin,
            relay,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RelayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let provider_endpoint =
            parse_env_or_default::<Url>("WEB3FORMS_ENDPOINT", DEFAULT_PROVIDER_ENDPOINT)?;
        let timeout_secs = parse_env_or_default::<u64>("EMAIL_TIMEOUT_SECS", "5")?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "EMAIL_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            recipient: get_env_or_default("INQUIRY_RECIPIENT", DEFAULT_RECIPIENT),
            from_name: get_env_or_default("INQUIRY_FROM_NAME", "CZQT Tools Website"),
            from_email: get_env_or_default("INQUIRY_FROM_EMAIL", "noreply@czqttools.com"),
            access_key: get_validated_secret("WEB3FORMS_ACCESS_KEY")?,
            provider_endpoint,
            delivery_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real access keys (UUIDs, API tokens) have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
