//! Core types for the inquiry pipeline.
//!
//! This module provides the form, wire payload, validated record, its text
//! renderings and the relay response shape.

pub mod api;
pub mod inquiry;
pub mod message;
pub mod pixel;

pub use api::{
    ACCEPTED_MESSAGE, ContactResponse, CustomerInfo, FAILURE_MESSAGE, MISSING_FIELDS_MESSAGE,
};
pub use inquiry::{
    COMPANY_PLACEHOLDER, InquiryError, InquiryForm, InquiryPayload, InquiryRecord, RequiredField,
    format_timestamp,
};
pub use message::FOLLOW_UP_REMINDER;
pub use pixel::{DEFAULT_PIXEL_ENDPOINT, tracking_pixel_url};
