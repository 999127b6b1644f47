//! Inquiry form, wire payload and validated record.

use core::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Rendered in place of the company when the customer leaves it blank.
pub const COMPANY_PLACEHOLDER: &str = "Not provided";

/// A field the customer must fill in before an inquiry is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Name,
    Email,
    Phone,
    Requirements,
}

impl RequiredField {
    /// Every required field, in form order.
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Phone, Self::Requirements];

    /// Returns the JSON field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Requirements => "requirements",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when building an [`InquiryRecord`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InquiryError {
    /// One or more required fields are empty or absent.
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<RequiredField>),
}

impl InquiryError {
    /// Returns the fields that were missing.
    #[must_use]
    pub fn missing(&self) -> &[RequiredField] {
        match self {
            Self::MissingFields(fields) => fields,
        }
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .copied()
        .map(RequiredField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw form values as typed by the customer.
///
/// Every field may be empty; validation happens when the form is turned
/// into an [`InquiryRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub requirements: String,
}

impl InquiryForm {
    /// Returns the required fields that are empty or whitespace-only.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        RequiredField::ALL
            .into_iter()
            .filter(|field| self.value(*field).trim().is_empty())
            .collect()
    }

    /// Returns `true` when every required field has a value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Reset every field to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Build a record stamped with the given submission time.
    ///
    /// # Errors
    ///
    /// Returns [`InquiryError::MissingFields`] if any required field is blank.
    pub fn to_record(&self, submitted_at: DateTime<Utc>) -> Result<InquiryRecord, InquiryError> {
        InquiryRecord::build(
            Some(self.name.clone()),
            Some(self.email.clone()),
            Some(self.phone.clone()),
            Some(self.company.clone()),
            Some(self.requirements.clone()),
            format_timestamp(submitted_at),
        )
    }

    const fn value(&self, field: RequiredField) -> &String {
        match field {
            RequiredField::Name => &self.name,
            RequiredField::Email => &self.email,
            RequiredField::Phone => &self.phone,
            RequiredField::Requirements => &self.requirements,
        }
    }
}

/// Inquiry JSON body as received by the relay.
///
/// All fields are optional so an absent field surfaces as a validation
/// failure rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl InquiryPayload {
    /// Validate the payload into a record.
    ///
    /// A missing or blank `timestamp` is replaced by `received_at`.
    ///
    /// # Errors
    ///
    /// Returns [`InquiryError::MissingFields`] listing every blank required field.
    pub fn into_record(self, received_at: DateTime<Utc>) -> Result<InquiryRecord, InquiryError> {
        let submitted_at =
            normalize(self.timestamp).unwrap_or_else(|| format_timestamp(received_at));

        InquiryRecord::build(
            self.name,
            self.email,
            self.phone,
            self.company,
            self.requirements,
            submitted_at,
        )
    }
}

/// A validated inquiry.
///
/// Required fields are guaranteed to hold more than whitespace. Values are
/// kept exactly as submitted. The record is never stored; it lives for one
/// request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InquiryRecord {
    name: String,
    email: String,
    phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<String>,
    requirements: String,
    #[serde(rename = "timestamp")]
    submitted_at: String,
}

impl InquiryRecord {
    fn build(
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        company: Option<String>,
        requirements: Option<String>,
        submitted_at: String,
    ) -> Result<Self, InquiryError> {
        let name = normalize(name);
        let email = normalize(email);
        let phone = normalize(phone);
        let requirements = normalize(requirements);

        match (name, email, phone, requirements) {
            (Some(name), Some(email), Some(phone), Some(requirements)) => Ok(Self {
                name,
                email,
                phone,
                company: normalize(company),
                requirements,
                submitted_at,
            }),
            (name, email, phone, requirements) => {
                let present = [
                    name.is_some(),
                    email.is_some(),
                    phone.is_some(),
                    requirements.is_some(),
                ];
                let missing = RequiredField::ALL
                    .into_iter()
                    .zip(present)
                    .filter_map(|(field, present)| (!present).then_some(field))
                    .collect();
                Err(InquiryError::MissingFields(missing))
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Returns the company, if the customer gave one.
    #[must_use]
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Returns the company or [`COMPANY_PLACEHOLDER`].
    #[must_use]
    pub fn company_or_placeholder(&self) -> &str {
        self.company().unwrap_or(COMPANY_PLACEHOLDER)
    }

    #[must_use]
    pub fn requirements(&self) -> &str {
        &self.requirements
    }

    /// Returns the client-side submission time as sent on the wire.
    #[must_use]
    pub fn submitted_at(&self) -> &str {
        &self.submitted_at
    }
}

/// Format a timestamp the way browsers do for `Date.toISOString()`.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Drops absent and blank values; anything else is returned untouched.
fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
