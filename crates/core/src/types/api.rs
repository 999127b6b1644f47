//! Relay response body.
//!
//! Serialized by the relay and parsed by the submission client, so both ends
//! share one definition of the JSON shape:
//!
//! ```text
//! 200 { "success": true,  "message", "emailContent", "customerInfo": {..} }
//! 400 { "success": false, "message" }
//! 500 { "success": false, "message" }
//! ```

use serde::{Deserialize, Serialize};

use super::inquiry::InquiryRecord;

/// Message returned with an accepted inquiry.
pub const ACCEPTED_MESSAGE: &str = "Inquiry received. We will contact you as soon as possible.";

/// Message returned when a required field is missing.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields.";

/// Generic message returned for unexpected failures.
pub const FAILURE_MESSAGE: &str = "Submission failed, please try again later.";

/// Response body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_info: Option<CustomerInfo>,
}

impl ContactResponse {
    /// Response for an inquiry the relay received and validated.
    #[must_use]
    pub fn accepted(record: &InquiryRecord) -> Self {
        Self {
            success: true,
            message: ACCEPTED_MESSAGE.to_string(),
            email_content: Some(record.plain_text()),
            customer_info: Some(CustomerInfo::from(record)),
        }
    }

    /// Failure response with a human-readable message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            email_content: None,
            customer_info: None,
        }
    }
}

/// Echo of the validated record.
///
/// `company` always holds a value: the customer's input or the placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub requirements: String,
}

impl From<&InquiryRecord> for CustomerInfo {
    fn from(record: &InquiryRecord) -> Self {
        Self {
            name: record.name().to_owned(),
            email: record.email().to_owned(),
            phone: record.phone().to_owned(),
            company: record.company_or_placeholder().to_owned(),
            requirements: record.requirements().to_owned(),
        }
    }
}
