//! Submit an inquiry to the relay.

use std::sync::Arc;

use czqt_client::{
    Browser, ClientConfig, Delivery, PixelTracker, SubmissionClient, SubmitOutcome,
};
use czqt_core::InquiryForm;
use tracing::info;
use url::Url;

/// Terminal stand-in for the browser hosting the form.
///
/// The `mailto:` link is printed so it can be opened by hand; navigation is
/// reported as the absolute thank-you URL on the relay's site.
pub struct TerminalBrowser {
    site: Url,
}

impl TerminalBrowser {
    /// Create a browser rooted at the relay's site.
    #[must_use]
    pub const fn new(site: Url) -> Self {
        Self { site }
    }

    /// Absolute URL for a site path.
    #[must_use]
    pub fn page_url(&self, path: &str) -> String {
        self.site
            .join(path)
            .map_or_else(|_| path.to_string(), String::from)
    }
}

impl Browser for TerminalBrowser {
    fn open_external(&self, url: &str) {
        info!("Relay unavailable. Send the inquiry from your mail client:");
        #[allow(clippy::print_stdout)]
        {
            println!("{url}");
        }
    }

    fn navigate(&self, path: &str) {
        info!("Redirecting to {}", self.page_url(path));
    }
}

/// Submit `form` and wait for the thank-you redirect.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the form is incomplete, or
/// the HTTP client cannot be built. Relay failures are not errors: they end
/// in the `mailto:` fallback.
pub async fn run(
    mut form: InquiryForm,
    relay_url: Option<Url>,
    track: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = relay_url {
        config.relay_url = url;
    }

    info!(relay = %config.relay_url, "Submitting inquiry");

    let browser = Arc::new(TerminalBrowser::new(config.relay_url.clone()));
    let pixel_endpoint = config.pixel_endpoint.clone();
    let mut client = SubmissionClient::new(config, browser)?;
    if track {
        let tracker = PixelTracker::new(pixel_endpoint).with_http(reqwest::Client::new());
        client = client.with_pixel_tracker(tracker);
    }

    let outcome = client.submit(&mut form).await?;
    report(&outcome);
    if let Some(pixel_url) = client.pixel_url() {
        info!(%pixel_url, "Tracking pixel");
    }
    outcome.redirect.await?;

    Ok(())
}

fn report(outcome: &SubmitOutcome) {
    match &outcome.delivery {
        Delivery::Relayed(response) => {
            info!("{}", response.message);
            if let Some(content) = &response.email_content {
                info!("\n{content}");
            }
        }
        Delivery::MailFallback { error, .. } => {
            info!(error = %error, "Inquiry handed to mail client");
        }
    }
}
