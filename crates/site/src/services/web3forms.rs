//! Web3Forms API client for inquiry notifications.
//!
//! Web3Forms accepts a JSON form submission and emails it to the address
//! bound to the access key. Every response carries a `success` flag; a
//! `200 OK` with `success: false` still means the email was not sent.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{DeliveryError, EmailProvider, OutboundEmail};
use crate::config::RelayConfig;

/// Request body for the submit endpoint.
#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    access_key: &'a str,
    subject: &'a str,
    from_name: &'a str,
    from_email: &'a str,
    to_email: &'a str,
    replyto: &'a str,
    message: &'a str,
}

/// Response body of the submit endpoint.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Web3Forms API client.
#[derive(Clone)]
pub struct Web3FormsClient {
    client: reqwest::Client,
    endpoint: Url,
    access_key: SecretString,
}

impl Web3FormsClient {
    /// Create a new Web3Forms client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &RelayConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("czqt-site/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.provider_endpoint.clone(),
            access_key: config.access_key.clone(),
        })
    }
}

#[async_trait]
impl EmailProvider for Web3FormsClient {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError> {
        let body = SubmitRequest {
            access_key: self.access_key.expose_secret(),
            subject: &email.subject,
            from_name: &email.from_name,
            from_email: &email.from_email,
            to_email: &email.to,
            replyto: &email.reply_to,
            message: &email.body,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let parsed = serde_json::from_str::<SubmitResponse>(&text);

        if !status.is_success() {
            let message = parsed.ok().and_then(|r| r.message).unwrap_or(text);
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed = parsed.map_err(|e| DeliveryError::Parse(e.to_string()))?;
        if parsed.success {
            Ok(())
        } else {
            Err(DeliveryError::Rejected(
                parsed.message.unwrap_or_else(|| "no reason given".to_string()),
            ))
        }
    }
}
