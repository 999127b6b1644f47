//! End-to-end test support for the inquiry pipeline.
//!
//! Tests run the real relay router on an ephemeral port and talk to it with
//! `reqwest` or the real submission client. Email delivery goes to a
//! [`StubProvider`], or to a fake Web3Forms endpoint when the provider's HTTP
//! contract is under test.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p czqt-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use czqt_client::Browser;
use czqt_site::{
    AppState, DeliveryError, EmailProvider, OutboundEmail, RelayConfig, SiteConfig,
};
use secrecy::SecretString;
use serde_json::Value;
use url::Url;

/// Test access key with enough entropy to pass credential validation.
pub const TEST_ACCESS_KEY: &str = "c695095f-8c25-4827-a6f5-82de6aafdfff";

/// Email provider double that records every notification.
#[derive(Default)]
pub struct StubProvider {
    fail: bool,
    calls: AtomicUsize,
    sent: Mutex<Vec<OutboundEmail>>,
}

impl StubProvider {
    /// Provider that accepts every email.
    #[must_use]
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Provider that rejects every email.
    #[must_use]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    /// Number of delivery attempts.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Emails passed to the provider, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailProvider for StubProvider {
    async fn send(&self, email: &OutboundEmail) -> Result<(), DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(email.clone());
        if self.fail {
            Err(DeliveryError::Rejected("stub provider failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Site configuration for tests, delivering through `provider_endpoint`.
#[must_use]
pub fn site_config(provider_endpoint: Url) -> SiteConfig {
    SiteConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        static_dir: None,
        cors_origin: None,
        relay: RelayConfig {
            recipient: "linda@czqttools.com".to_string(),
            from_name: "CZQT Tools Website".to_string(),
            from_email: "noreply@czqttools.com".to_string(),
            access_key: SecretString::from(TEST_ACCESS_KEY.to_string()),
            provider_endpoint,
            delivery_timeout: Duration::from_secs(5),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A relay running on an ephemeral port.
pub struct RelayServer {
    pub addr: SocketAddr,
}

impl RelayServer {
    /// Start the relay with `provider` as its email backend.
    pub async fn start(provider: Arc<dyn EmailProvider>) -> Self {
        let config = site_config(Url::parse("http://127.0.0.1:9/submit").unwrap());
        Self::start_with_state(AppState::with_provider(config, provider)).await
    }

    /// Start the relay with prepared state.
    pub async fn start_with_state(state: AppState) -> Self {
        let addr = serve(czqt_site::app(state)).await;
        Self { addr }
    }

    /// Absolute URL of a path on this relay.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).unwrap()
    }

    /// The inquiry endpoint.
    #[must_use]
    pub fn contact_url(&self) -> Url {
        self.url("/api/contact")
    }
}

/// Captured bodies posted to a fake Web3Forms endpoint.
pub type Captured = Arc<Mutex<Vec<Value>>>;

/// Serve a fake Web3Forms submit endpoint answering with `status` and `reply`.
pub async fn fake_web3forms(status: StatusCode, reply: Value) -> (Url, Captured) {
    let captured: Captured = Arc::default();
    let app = Router::new()
        .route(
            "/submit",
            post(
                move |State(captured): State<Captured>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        captured.lock().unwrap().push(body);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(Arc::clone(&captured));

    let addr = serve(app).await;
    (
        Url::parse(&format!("http://{addr}/submit")).unwrap(),
        captured,
    )
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Browser double that records what the client asked it to do.
#[derive(Default)]
pub struct RecordingBrowser {
    opened: Mutex<Vec<String>>,
    navigated: Mutex<Vec<String>>,
}

impl RecordingBrowser {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::default()
    }

    /// URLs handed to the mail client.
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    /// Paths navigated to.
    #[must_use]
    pub fn navigated(&self) -> Vec<String> {
        self.navigated.lock().unwrap().clone()
    }
}

impl Browser for RecordingBrowser {
    fn open_external(&self, url: &str) {
        self.opened.lock().unwrap().push(url.to_string());
    }

    fn navigate(&self, path: &str) {
        self.navigated.lock().unwrap().push(path.to_string());
    }
}
