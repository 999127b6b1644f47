//! Text renderings of an inquiry.
//!
//! The relay returns [`InquiryRecord::plain_text`] to the caller and emails
//! [`InquiryRecord::notification_body`] to the sales contact. The client uses
//! [`InquiryRecord::mailto_link`] when the relay cannot be reached, so all
//! three share one field layout.

use super::inquiry::InquiryRecord;

const HEADING: &str = "Customer inquiry details:";

/// Closing line of the notification email.
pub const FOLLOW_UP_REMINDER: &str = "Please follow up with the customer promptly.";

impl InquiryRecord {
    /// Labelled field values in display order.
    fn labelled_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Name", self.name()),
            ("Email", self.email()),
            ("Phone", self.phone()),
            ("Company", self.company_or_placeholder()),
            ("Requirements", self.requirements()),
            ("Submitted at", self.submitted_at()),
        ]
    }

    fn field_lines(&self) -> Vec<String> {
        self.labelled_fields()
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect()
    }

    /// Plain-text rendering returned to the caller as `emailContent`.
    #[must_use]
    pub fn plain_text(&self) -> String {
        format!("{HEADING}\n\n{}", self.field_lines().join("\n"))
    }

    /// Subject line shared by the notification email and the mailto fallback.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("Product inquiry - {}", self.name())
    }

    /// Message body sent to the sales contact.
    #[must_use]
    pub fn notification_body(&self) -> String {
        format!("{}\n\n{FOLLOW_UP_REMINDER}", self.plain_text())
    }

    /// Pre-filled `mailto:` link addressed to `recipient`.
    ///
    /// Subject and body are percent-encoded; body lines are CRLF-separated as
    /// mail clients expect.
    #[must_use]
    pub fn mailto_link(&self, recipient: &str) -> String {
        let body = self.field_lines().join("\r\n");
        format!(
            "mailto:{recipient}?subject={}&body={}",
            urlencoding::encode(&self.subject()),
            urlencoding::encode(&body),
        )
    }
}
