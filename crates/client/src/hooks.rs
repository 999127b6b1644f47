//! Host surface and instrumentation seams.

use std::sync::Mutex;

use czqt_core::{InquiryForm, tracking_pixel_url};
use url::Url;

/// The surface hosting the form: a browser tab, a terminal, a test double.
pub trait Browser: Send + Sync {
    /// Hand a URL to an external application (the `mailto:` fallback).
    fn open_external(&self, url: &str);

    /// Move the visitor to a site path.
    fn navigate(&self, path: &str);
}

/// Side channel notified of every submission attempt before it is sent.
///
/// Implementations must not block or fail the submission.
pub trait Instrumentation: Send + Sync {
    fn record(&self, form: &InquiryForm);
}

/// Instrumentation that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInstrumentation;

impl Instrumentation for NoopInstrumentation {
    fn record(&self, _form: &InquiryForm) {}
}

/// Builds the tracking-pixel URL for each submission.
///
/// The URL is kept for the host to render as an image. With an HTTP client
/// attached the pixel is also requested directly; the response is ignored.
#[derive(Debug)]
pub struct PixelTracker {
    endpoint: Url,
    http: Option<reqwest::Client>,
    last_pixel_url: Mutex<Option<Url>>,
}

impl PixelTracker {
    /// Create a tracker that only builds and stores the pixel URL.
    #[must_use]
    pub const fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http: None,
            last_pixel_url: Mutex::new(None),
        }
    }

    /// Also fire a detached GET for each pixel URL.
    #[must_use]
    pub fn with_http(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Pixel URL of the most recent submission.
    #[must_use]
    pub fn last_pixel_url(&self) -> Option<Url> {
        self.last_pixel_url
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |url| url.clone())
    }

    fn fire(&self, url: &Url) {
        let Some(client) = &self.http else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime; tracking pixel not requested");
            return;
        };

        let request = client.get(url.clone());
        runtime.spawn(async move {
            if let Err(e) = request.send().await {
                tracing::debug!(error = %e, "Tracking pixel request failed");
            }
        });
    }
}

impl Instrumentation for PixelTracker {
    fn record(&self, form: &InquiryForm) {
        let url = tracking_pixel_url(&self.endpoint, form);
        tracing::debug!(pixel_url = %url, "Tracking pixel URL built");

        self.fire(&url);

        match self.last_pixel_url.lock() {
            Ok(mut slot) => *slot = Some(url),
            Err(poisoned) => *poisoned.into_inner() = Some(url),
        }
    }
}
