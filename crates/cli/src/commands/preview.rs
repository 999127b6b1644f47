//! Render an inquiry without sending it.

use chrono::Utc;
use czqt_client::ClientConfig;
use czqt_core::{InquiryForm, InquiryRecord, tracking_pixel_url};

/// Print the relay's `emailContent`, the notification email, the `mailto:`
/// fallback and the tracking pixel URL for `form`.
///
/// # Errors
///
/// Returns an error if configuration is invalid or a required field is blank.
pub fn run(form: &InquiryForm) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let record = form.to_record(Utc::now())?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", render(form, &record, &config));
    }
    Ok(())
}

fn render(form: &InquiryForm, record: &InquiryRecord, config: &ClientConfig) -> String {
    format!(
        "== emailContent ==\n{}\n\n\
         == Notification ==\nSubject: {}\n\n{}\n\n\
         == Mail fallback ==\n{}\n\n\
         == Tracking pixel ==\n{}",
        record.plain_text(),
        record.subject(),
        record.notification_body(),
        record.mailto_link(&config.fallback_recipient),
        tracking_pixel_url(&config.pixel_endpoint, form),
    )
}
