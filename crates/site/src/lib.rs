//! CZQT Tools landing site library.
//!
//! Serves the landing page export and relays customer inquiries to the
//! sales inbox through an email delivery provider.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ConfigError, RelayConfig, SiteConfig};
pub use routes::app;
pub use services::{DeliveryError, EmailProvider, InquiryRelay, OutboundEmail, RelayOutcome};
pub use state::AppState;
