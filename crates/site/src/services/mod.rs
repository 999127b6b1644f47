//! Business logic services for the site.
//!
//! # Services
//!
//! - `relay` - Validates an inquiry and forwards it to the email provider
//! - `web3forms` - HTTP client for the Web3Forms email delivery API
//!
//! The relay only sees the [`EmailProvider`] trait, so tests and alternative
//! providers plug in without touching the handler.

pub mod relay;
pub mod web3forms;

use std::time::Duration;

use async_trait::async_trait;
use czqt_core::InquiryRecord;
use thiserror::Error;

use crate::config::RelayConfig;

pub use relay::{InquiryRelay, RelayOutcome};
pub use web3forms::Web3FormsClient;

/// Errors that can occur when delivering a notification email.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API answered but reported the message as not sent.
    #[error("Provider rejected message: {0}")]
    Rejected(String),

    /// Provider did not answer in time.
    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Notification email for one inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub subject: String,
    pub from_name: String,
    pub from_email: String,
    pub to: String,
    /// Customer address, so replies reach the customer directly.
    pub reply_to: String,
    pub body: String,
}

impl OutboundEmail {
    /// Compose the notification for `record` using the fixed relay settings.
    #[must_use]
    pub fn for_inquiry(record: &InquiryRecord, config: &RelayConfig) -> Self {
        Self {
            subject: record.subject(),
            from_name: config.from_name.clone(),
            from_email: config.from_email.clone(),
            to: config.recipient.clone(),
            reply_to: record.email().to_owned(),
            body: record.notification_body(),
        }
    }
}

/// A transactional email backend.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Deliver one email.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` if the provider is unreachable, answers with a
    /// failure status, or reports the message as not sent.
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError>;
}
