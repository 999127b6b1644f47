//! Inquiry submission flow.
//!
//! ```text
//! submit ─► required fields? ─no─► SubmitError::Incomplete
//!              │yes
//!              ▼
//!          instrumentation.record(form)
//!              │
//!          POST relay ─fail─► open mailto: fallback
//!              │ok                │
//!              ▼                  ▼
//!          show confirmation, clear form, navigate after delay
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use czqt_core::{ContactResponse, InquiryForm, InquiryRecord};
use tokio::task::JoinHandle;
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{SubmitError, TransportError};
use crate::hooks::{Browser, Instrumentation, PixelTracker};

/// How the inquiry left the client.
#[derive(Debug)]
pub enum Delivery {
    /// The relay accepted the inquiry.
    Relayed(ContactResponse),
    /// The relay could not be used; the visitor's mail client was opened.
    MailFallback {
        mailto: String,
        error: TransportError,
    },
}

/// Result of a submission the client went through with.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub record: InquiryRecord,
    pub delivery: Delivery,
    /// Pending navigation to the thank-you path.
    pub redirect: JoinHandle<()>,
}

/// Submits inquiry forms to the relay.
pub struct SubmissionClient {
    config: ClientConfig,
    http: reqwest::Client,
    browser: Arc<dyn Browser>,
    instrumentation: Arc<dyn Instrumentation>,
    pixel_tracker: Option<Arc<PixelTracker>>,
    in_flight: AtomicBool,
    show_confirmation: AtomicBool,
}

impl SubmissionClient {
    /// Create a client with a [`PixelTracker`] that stores pixel URLs.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: ClientConfig, browser: Arc<dyn Browser>) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("czqt-client/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;
        let tracker = Arc::new(PixelTracker::new(config.pixel_endpoint.clone()));

        Ok(Self {
            config,
            http,
            browser,
            instrumentation: Arc::clone(&tracker) as Arc<dyn Instrumentation>,
            pixel_tracker: Some(tracker),
            in_flight: AtomicBool::new(false),
            show_confirmation: AtomicBool::new(false),
        })
    }

    /// Replace the instrumentation hook.
    ///
    /// [`Self::pixel_url`] returns `None` afterwards.
    #[must_use]
    pub fn with_instrumentation(mut self, instrumentation: Arc<dyn Instrumentation>) -> Self {
        self.instrumentation = instrumentation;
        self.pixel_tracker = None;
        self
    }

    /// Replace the default pixel tracker, e.g. with one that fires requests.
    #[must_use]
    pub fn with_pixel_tracker(mut self, tracker: PixelTracker) -> Self {
        let tracker = Arc::new(tracker);
        self.instrumentation = Arc::clone(&tracker) as Arc<dyn Instrumentation>;
        self.pixel_tracker = Some(tracker);
        self
    }

    /// Tracking-pixel URL of the most recent submission, for the host to
    /// render as an invisible image.
    #[must_use]
    pub fn pixel_url(&self) -> Option<Url> {
        self.pixel_tracker
            .as_ref()
            .and_then(|tracker| tracker.last_pixel_url())
    }

    /// Get a reference to the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `true` while a submission is outstanding.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// `true` once a submission has completed, until dismissed.
    #[must_use]
    pub fn show_confirmation(&self) -> bool {
        self.show_confirmation.load(Ordering::Acquire)
    }

    /// Hide the confirmation again.
    pub fn dismiss_confirmation(&self) {
        self.show_confirmation.store(false, Ordering::Release);
    }

    /// Submit the form.
    ///
    /// The relay call is attempted once. If it fails for any reason the
    /// inquiry is handed to the visitor's mail client instead; either way the
    /// confirmation is shown, the form is cleared and navigation to the
    /// thank-you path is scheduled.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::InFlight` while another submission is
    /// outstanding and `SubmitError::Incomplete` if a required field is
    /// blank. Neither performs any I/O or touches the form.
    #[instrument(skip_all)]
    pub async fn submit(&self, form: &mut InquiryForm) -> Result<SubmitOutcome, SubmitError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(SubmitError::InFlight)?;

        let record = form.to_record(Utc::now())?;

        self.instrumentation.record(form);

        let delivery = match self.post(&record).await {
            Ok(response) => {
                tracing::info!(message = %response.message, "Inquiry submitted");
                Delivery::Relayed(response)
            }
            Err(error) => {
                tracing::warn!(error = %error, "Relay unavailable; opening mail client");
                let mailto = record.mailto_link(&self.config.fallback_recipient);
                self.browser.open_external(&mailto);
                Delivery::MailFallback { mailto, error }
            }
        };

        self.show_confirmation.store(true, Ordering::Release);
        form.clear();

        let redirect = schedule_navigation(
            Arc::clone(&self.browser),
            self.config.thank_you_path.clone(),
            self.config.redirect_delay,
        );

        Ok(SubmitOutcome {
            record,
            delivery,
            redirect,
        })
    }

    async fn post(&self, record: &InquiryRecord) -> Result<ContactResponse, TransportError> {
        let response = self
            .http
            .post(self.config.relay_url.clone())
            .json(record)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ContactResponse>(&text)
                .map(|r| r.message)
                .unwrap_or(text);
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Navigate to `path` once `delay` has passed.
///
/// The task is detached; dropping the handle does not cancel it.
pub fn schedule_navigation(
    browser: Arc<dyn Browser>,
    path: String,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        browser.navigate(&path);
    })
}

/// Holds the in-flight flag for one submission.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    use axum::{Json, Router, http::StatusCode, routing::post};
    use czqt_core::RequiredField;
    use serde_json::Value;
    use url::Url;

    use super::*;

    #[derive(Default)]
    struct RecordingBrowser {
        opened: Mutex<Vec<String>>,
        navigated: Mutex<Vec<String>>,
    }

    impl Browser for RecordingBrowser {
        fn open_external(&self, url: &str) {
            self.opened.lock().unwrap().push(url.to_string());
        }

        fn navigate(&self, path: &str) {
            self.navigated.lock().unwrap().push(path.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingInstrumentation {
        forms: Mutex<Vec<InquiryForm>>,
    }

    impl Instrumentation for RecordingInstrumentation {
        fn record(&self, form: &InquiryForm) {
            self.forms.lock().unwrap().push(form.clone());
        }
    }

    struct FakeRelay {
        url: Url,
        calls: Arc<AtomicUsize>,
        bodies: Arc<Mutex<Vec<Value>>>,
    }

    async fn fake_relay(status: StatusCode, reply: &'static str) -> FakeRelay {
        let calls = Arc::new(AtomicUsize::new(0));
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let (handler_calls, handler_bodies) = (Arc::clone(&calls), Arc::clone(&bodies));

        let app = Router::new().route(
            "/api/contact",
            post(move |Json(body): Json<Value>| {
                let calls = Arc::clone(&handler_calls);
                let bodies = Arc::clone(&handler_bodies);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    bodies.lock().unwrap().push(body);
                    (status, reply)
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeRelay {
            url: Url::parse(&format!("http://{addr}/api/contact")).unwrap(),
            calls,
            bodies,
        }
    }

    fn accepted_reply() -> &'static str {
        r#"{"success":true,"message":"Inquiry received. We will contact you as soon as possible.","emailContent":"Customer inquiry details:","customerInfo":{"name":"Li Wei","email":"li@acme.com","phone":"+86 139 0000 0000","company":"Not provided","requirements":"Need D10 4-flute for HRC62"}}"#
    }

    fn client(relay: &Url, browser: &Arc<RecordingBrowser>) -> SubmissionClient {
        let mut config = ClientConfig::new(
            relay.clone(),
            Url::parse("http://127.0.0.1:9/track/a.jpeg").unwrap(),
        );
        config.redirect_delay = Duration::from_millis(10);
        SubmissionClient::new(config, Arc::clone(browser) as Arc<dyn Browser>).unwrap()
    }

    fn form() -> InquiryForm {
        InquiryForm {
            name: "Li Wei".to_string(),
            email: "li@acme.com".to_string(),
            phone: "+86 139 0000 0000".to_string(),
            company: String::new(),
            requirements: "Need D10 4-flute for HRC62".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_success_confirms_and_redirects() {
        let relay = fake_relay(StatusCode::OK, accepted_reply()).await;
        let browser = Arc::new(RecordingBrowser::default());
        let client = client(&relay.url, &browser);
        let mut form = form();

        let outcome = client.submit(&mut form).await.unwrap();

        assert!(matches!(outcome.delivery, Delivery::Relayed(ref r) if r.success));
        assert!(client.show_confirmation());
        assert!(!client.in_flight());
        assert_eq!(form, InquiryForm::default());
        assert!(browser.opened.lock().unwrap().is_empty());

        outcome.redirect.await.unwrap();
        assert_eq!(*browser.navigated.lock().unwrap(), vec!["/thank-you"]);

        let bodies = relay.bodies.lock().unwrap();
        assert_eq!(bodies[0]["name"], "Li Wei");
        assert_eq!(bodies[0]["requirements"], "Need D10 4-flute for HRC62");
        assert!(bodies[0].get("company").is_none());
        assert!(bodies[0]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_incomplete_form_makes_no_request() {
        let relay = fake_relay(StatusCode::OK, accepted_reply()).await;
        let browser = Arc::new(RecordingBrowser::default());
        let client = client(&relay.url, &browser);
        let mut form = form();
        form.requirements = "  ".to_string();

        let err = client.submit(&mut form).await.unwrap_err();

        assert!(matches!(
            err,
            SubmitError::Incomplete(ref e) if e.missing() == [RequiredField::Requirements]
        ));
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);
        assert!(!client.in_flight());
        assert!(!client.show_confirmation());
        assert_eq!(form.name, "Li Wei");
    }

    #[tokio::test]
    async fn test_relay_error_status_falls_back_to_mail() {
        let relay = fake_relay(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"success":false,"message":"Submission failed, please try again later."}"#,
        )
        .await;
        let browser = Arc::new(RecordingBrowser::default());
        let client = client(&relay.url, &browser);
        let mut form = form();

        let outcome = client.submit(&mut form).await.unwrap();

        let Delivery::MailFallback { mailto, error } = &outcome.delivery else {
            panic!("expected mail fallback");
        };
        assert!(matches!(error, TransportError::Status { status: 500, .. }));
        assert!(mailto.starts_with("mailto:linda@czqttools.com?subject=Product%20inquiry%20-%20Li%20Wei"));
        assert!(mailto.contains("li%40acme.com"));
        assert!(mailto.contains("Need%20D10%204-flute%20for%20HRC62"));
        assert_eq!(*browser.opened.lock().unwrap(), vec![mailto.clone()]);

        assert!(client.show_confirmation());
        assert_eq!(form, InquiryForm::default());
        outcome.redirect.await.unwrap();
        assert_eq!(*browser.navigated.lock().unwrap(), vec!["/thank-you"]);
    }

    #[tokio::test]
    async fn test_unreachable_relay_falls_back_to_mail() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let relay = Url::parse(&format!("http://{addr}/api/contact")).unwrap();
        let browser = Arc::new(RecordingBrowser::default());
        let client = client(&relay, &browser);
        let mut form = form();

        let outcome = client.submit(&mut form).await.unwrap();

        assert!(matches!(
            outcome.delivery,
            Delivery::MailFallback {
                error: TransportError::Http(_),
                ..
            }
        ));
        assert_eq!(browser.opened.lock().unwrap().len(), 1);
        assert!(client.show_confirmation());
    }

    #[tokio::test]
    async fn test_unreadable_success_body_falls_back_to_mail() {
        let relay = fake_relay(StatusCode::OK, "<html>ok</html>").await;
        let browser = Arc::new(RecordingBrowser::default());
        let client = client(&relay.url, &browser);

        let outcome = client.submit(&mut form()).await.unwrap();

        assert!(matches!(
            outcome.delivery,
            Delivery::MailFallback {
                error: TransportError::Decode(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_rejected() {
        let relay = fake_relay(StatusCode::OK, accepted_reply()).await;
        let browser = Arc::new(RecordingBrowser::default());
        let client = client(&relay.url, &browser);
        let (mut first, mut second) = (form(), form());

        let (first, second) = tokio::join!(client.submit(&mut first), client.submit(&mut second));

        assert!(first.is_ok());
        assert!(matches!(second, Err(SubmitError::InFlight)));
        assert_eq!(relay.calls.load(Ordering::SeqCst), 1);
        assert!(!client.in_flight());
    }

    #[tokio::test]
    async fn test_instrumentation_sees_form_before_clear() {
        let relay = fake_relay(StatusCode::OK, accepted_reply()).await;
        let browser = Arc::new(RecordingBrowser::default());
        let instrumentation = Arc::new(RecordingInstrumentation::default());
        let client = client(&relay.url, &browser)
            .with_instrumentation(Arc::clone(&instrumentation) as Arc<dyn Instrumentation>);

        client.submit(&mut form()).await.unwrap();

        assert_eq!(*instrumentation.forms.lock().unwrap(), vec![form()]);
        assert!(client.pixel_url().is_none());
    }

    #[tokio::test]
    async fn test_pixel_url_kept_after_submit() {
        let relay = fake_relay(StatusCode::OK, accepted_reply()).await;
        let browser = Arc::new(RecordingBrowser::default());
        let client = client(&relay.url, &browser);
        assert!(client.pixel_url().is_none());

        client.submit(&mut form()).await.unwrap();

        let url = client.pixel_url().unwrap();
        assert_eq!(url.path(), "/track/a.jpeg");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("e".to_string(), "li@acme.com".to_string())));
        assert!(pairs.contains(&("n".to_string(), "Li Wei".to_string())));
    }

    #[tokio::test]
    async fn test_custom_pixel_tracker_exposes_url() {
        let relay = fake_relay(StatusCode::OK, accepted_reply()).await;
        let browser = Arc::new(RecordingBrowser::default());
        let endpoint = Url::parse("https://pixel.example.net/track/b.jpeg").unwrap();
        let client = client(&relay.url, &browser).with_pixel_tracker(PixelTracker::new(endpoint));

        client.submit(&mut form()).await.unwrap();

        assert_eq!(client.pixel_url().unwrap().host_str(), Some("pixel.example.net"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_waits_for_delay() {
        let browser = Arc::new(RecordingBrowser::default());
        let handle = schedule_navigation(
            Arc::clone(&browser) as Arc<dyn Browser>,
            "/thank-you".to_string(),
            Duration::from_secs(2),
        );

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(browser.navigated.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.await.unwrap();
        assert_eq!(*browser.navigated.lock().unwrap(), vec!["/thank-you"]);
    }

    #[test]
    fn test_in_flight_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let _guard = InFlightGuard::acquire(&flag).unwrap();
            assert!(flag.load(Ordering::SeqCst));
            assert!(InFlightGuard::acquire(&flag).is_none());
        }
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_accepted_reply_parses() {
        let parsed: ContactResponse = serde_json::from_str(accepted_reply()).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.customer_info.unwrap().company, "Not provided");
    }
}
