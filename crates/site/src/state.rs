//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::services::{DeliveryError, EmailProvider, InquiryRelay, Web3FormsClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; nothing in it changes after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    relay: InquiryRelay,
}

impl AppState {
    /// Create state backed by the Web3Forms provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn new(config: SiteConfig) -> Result<Self, DeliveryError> {
        let provider = Web3FormsClient::new(&config.relay)?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// Create state with an explicit email provider.
    #[must_use]
    pub fn with_provider(config: SiteConfig, provider: Arc<dyn EmailProvider>) -> Self {
        let relay = InquiryRelay::new(config.relay.clone(), provider);
        Self {
            inner: Arc::new(AppStateInner { config, relay }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the inquiry relay.
    #[must_use]
    pub fn relay(&self) -> &InquiryRelay {
        &self.inner.relay
    }
}
