//! Unified error handling with Sentry integration.
//!
//! Every failure leaves the relay as a JSON [`ContactResponse`] with
//! `success: false`. Server errors are captured to Sentry before responding;
//! the caller only ever sees a generic message for them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use czqt_core::{ContactResponse, FAILURE_MESSAGE, InquiryError, MISSING_FIELDS_MESSAGE};
use thiserror::Error;

use crate::services::relay::RelayError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required inquiry fields are missing.
    #[error("Validation error: {0}")]
    Validation(#[from] InquiryError),

    /// Anything unexpected while processing a request.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Validation(e) => Self::Validation(e),
            RelayError::Malformed(e) => Self::Internal(e.to_string()),
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Validation(e) => {
                tracing::info!(missing = %e, "Inquiry rejected");
                MISSING_FIELDS_MESSAGE
            }
            Self::Internal(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
                FAILURE_MESSAGE
            }
        };

        (self.status(), Json(ContactResponse::failure(message))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
