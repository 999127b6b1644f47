//! Submission client errors.

use czqt_core::InquiryError;
use thiserror::Error;

/// Reasons a submission is refused before any network I/O.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Another submission from this client is still outstanding.
    #[error("A submission is already in progress")]
    InFlight,

    /// The form is missing required fields.
    #[error(transparent)]
    Incomplete(#[from] InquiryError),
}

/// Failures talking to the relay.
///
/// Each one triggers the mail-client fallback; none reaches the visitor.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, timeout, or other HTTP-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Relay answered with a non-success status.
    #[error("Relay returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Relay answered 2xx with a body that is not a relay response.
    #[error("Unreadable relay response: {0}")]
    Decode(String),
}
