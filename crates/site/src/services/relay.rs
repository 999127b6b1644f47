//! Inquiry relay.
//!
//! Validates one inquiry, logs it, and forwards it to the email provider.
//! Delivery is best effort: the caller is told the inquiry was received
//! whether or not the provider accepted the notification.

use std::sync::Arc;

use chrono::Utc;
use czqt_core::{InquiryError, InquiryPayload, InquiryRecord};
use thiserror::Error;
use tracing::instrument;

use super::{DeliveryError, EmailProvider, OutboundEmail};
use crate::config::RelayConfig;

/// Errors that reject an inquiry.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A required field is empty or absent.
    #[error(transparent)]
    Validation(#[from] InquiryError),

    /// The body is not a JSON inquiry.
    #[error("Malformed inquiry body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result of relaying one inquiry.
///
/// `received` and `delivered` are independent: a received inquiry may not
/// have been delivered. Only `received` is visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub received: bool,
    pub delivered: bool,
    pub record: InquiryRecord,
}

/// Validates inquiries and forwards them to an [`EmailProvider`].
#[derive(Clone)]
pub struct InquiryRelay {
    config: RelayConfig,
    provider: Arc<dyn EmailProvider>,
}

impl InquiryRelay {
    /// Create a relay with fixed settings and a provider.
    #[must_use]
    pub fn new(config: RelayConfig, provider: Arc<dyn EmailProvider>) -> Self {
        Self { config, provider }
    }

    /// Get a reference to the relay configuration.
    #[must_use]
    pub const fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Parse a raw request body and relay it.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Malformed` if the body is not a JSON object of
    /// string fields, `RelayError::Validation` if a required field is blank.
    pub async fn handle(&self, body: &[u8]) -> Result<RelayOutcome, RelayError> {
        let payload: InquiryPayload = serde_json::from_slice(body)?;
        Ok(self.relay(payload).await?)
    }

    /// Validate and relay a parsed inquiry.
    ///
    /// No provider call is made when validation fails.
    ///
    /// # Errors
    ///
    /// Returns `InquiryError::MissingFields` listing the blank required fields.
    #[instrument(skip_all)]
    pub async fn relay(&self, payload: InquiryPayload) -> Result<RelayOutcome, InquiryError> {
        let record = payload.into_record(Utc::now())?;

        tracing::info!(
            name = %record.name(),
            email = %record.email(),
            phone = %record.phone(),
            company = %record.company_or_placeholder(),
            requirements = %record.requirements(),
            submitted_at = %record.submitted_at(),
            "New inquiry received"
        );

        let delivered = self.deliver(&record).await;

        Ok(RelayOutcome {
            received: true,
            delivered,
            record,
        })
    }

    /// Single delivery attempt bounded by the configured timeout.
    async fn deliver(&self, record: &InquiryRecord) -> bool {
        let email = OutboundEmail::for_inquiry(record, &self.config);
        let limit = self.config.delivery_timeout;

        let result = tokio::time::timeout(limit, self.provider.send(&email))
            .await
            .unwrap_or(Err(DeliveryError::Timeout(limit)));

        match result {
            Ok(()) => {
                tracing::info!(to = %email.to, "Inquiry notification sent");
                true
            }
            Err(e) => {
                tracing::warn!(
                    to = %email.to,
                    customer_email = %record.email(),
                    error = %e,
                    "Inquiry notification failed; inquiry still acknowledged"
                );
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use czqt_core::{COMPANY_PLACEHOLDER, RequiredField};
    use secrecy::SecretString;
    use url::Url;

    use super::*;

    enum Behavior {
        Accept,
        Reject,
        Hang,
    }

    struct StubProvider {
        behavior: Behavior,
        calls: AtomicUsize,
        last: Mutex<Option<OutboundEmail>>,
    }

    impl StubProvider {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl EmailProvider for StubProvider {
        async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(email.clone());
            match self.behavior {
                Behavior::Accept => Ok(()),
                Behavior::Reject => Err(DeliveryError::Rejected("quota exceeded".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
            }
        }
    }

    fn relay(provider: Arc<StubProvider>) -> InquiryRelay {
        InquiryRelay::new(
            RelayConfig {
                recipient: "sales@czqttools.com".to_string(),
                from_name: "CZQT Tools Website".to_string(),
                from_email: "noreply@czqttools.com".to_string(),
                access_key: SecretString::from("c695095f-8c25-4827-a6f5-82de6aafdfff".to_string()),
                provider_endpoint: Url::parse("http://127.0.0.1:9/submit").unwrap(),
                delivery_timeout: Duration::from_secs(5),
            },
            provider,
        )
    }

    fn payload() -> InquiryPayload {
        InquiryPayload {
            name: Some("Li Wei".to_string()),
            email: Some("li@acme.com".to_string()),
            phone: Some("+86 139 0000 0000".to_string()),
            company: Some(String::new()),
            requirements: Some("Need D10 4-flute for HRC62".to_string()),
            timestamp: Some("2025-03-14T08:30:00.000Z".to_string()),
        }
    }

    #[tokio::test]
    async fn test_relay_delivers_valid_inquiry() {
        let provider = StubProvider::new(Behavior::Accept);
        let outcome = relay(Arc::clone(&provider)).relay(payload()).await.unwrap();

        assert!(outcome.received);
        assert!(outcome.delivered);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let sent = provider.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.to, "sales@czqttools.com");
        assert_eq!(sent.from_name, "CZQT Tools Website");
        assert_eq!(sent.reply_to, "li@acme.com");
        assert_eq!(sent.subject, "Product inquiry - Li Wei");
        assert!(sent.body.contains(&format!("Company: {COMPANY_PLACEHOLDER}")));
    }

    #[tokio::test]
    async fn test_relay_acknowledges_when_provider_rejects() {
        let provider = StubProvider::new(Behavior::Reject);
        let outcome = relay(Arc::clone(&provider)).relay(payload()).await.unwrap();

        assert!(outcome.received);
        assert!(!outcome.delivered);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_relay_times_out_slow_provider() {
        let provider = StubProvider::new(Behavior::Hang);
        let outcome = relay(Arc::clone(&provider)).relay(payload()).await.unwrap();

        assert!(outcome.received);
        assert!(!outcome.delivered);
    }

    #[tokio::test]
    async fn test_relay_rejects_missing_requirements_without_delivery() {
        let provider = StubProvider::new(Behavior::Accept);
        let mut incomplete = payload();
        incomplete.requirements = None;

        let err = relay(Arc::clone(&provider))
            .relay(incomplete)
            .await
            .unwrap_err();

        assert_eq!(err.missing(), &[RequiredField::Requirements]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handle_rejects_malformed_body() {
        let provider = StubProvider::new(Behavior::Accept);
        let err = relay(Arc::clone(&provider))
            .handle(b"name=Li+Wei")
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Malformed(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handle_parses_json_body() {
        let provider = StubProvider::new(Behavior::Accept);
        let body = serde_json::to_vec(&payload()).unwrap();
        let outcome = relay(provider).handle(&body).await.unwrap();

        assert_eq!(outcome.record.name(), "Li Wei");
        assert_eq!(outcome.record.submitted_at(), "2025-03-14T08:30:00.000Z");
    }
}
