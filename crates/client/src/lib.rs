//! CZQT Tools inquiry submission client.
//!
//! Owns the form-side half of the inquiry pipeline: checking required fields,
//! posting to the relay, falling back to the visitor's mail client when the
//! relay is unreachable, and redirecting to the thank-you page.
//!
//! The host surface (a browser, a terminal) is abstracted by [`Browser`];
//! visitor tracking by [`Instrumentation`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod hooks;
pub mod submission;

pub use config::{ClientConfig, ConfigError};
pub use error::{SubmitError, TransportError};
pub use hooks::{Browser, Instrumentation, NoopInstrumentation, PixelTracker};
pub use submission::{Delivery, SubmissionClient, SubmitOutcome};
