//! CZQT Core - Shared inquiry types.
//!
//! This crate provides the types used by every part of the lead-submission
//! pipeline:
//! - `site` - Relay server that validates and forwards inquiries
//! - `client` - Submission client that captures and posts the form
//! - `cli` - Command-line front end for the client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Rendering an inquiry (plain text, mailto link, tracking pixel URL)
//! lives here so the relay and the client agree on every byte.
//!
//! # Modules
//!
//! - [`types`] - Form, record, rendering and relay response types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
