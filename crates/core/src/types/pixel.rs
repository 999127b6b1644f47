//! Tracking pixel URL.

use url::Url;

use super::inquiry::InquiryForm;

/// Default pixel endpoint used by the landing page.
pub const DEFAULT_PIXEL_ENDPOINT: &str = "https://pixeltrack-worker.laifa.xin/track/bzxN7N1R.jpeg";

/// Build the tracking pixel URL for a form.
///
/// Field values are appended as query parameters (`e`, `p`, `n`, `m`, `c1`)
/// exactly as typed, including empty ones. Parameters already present on the
/// endpoint with those names are replaced.
#[must_use]
pub fn tracking_pixel_url(endpoint: &Url, form: &InquiryForm) -> Url {
    let params = [
        ("e", form.email.as_str()),
        ("p", form.phone.as_str()),
        ("n", form.name.as_str()),
        ("m", form.requirements.as_str()),
        ("c1", form.company.as_str()),
    ];

    let kept: Vec<(String, String)> = endpoint
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| key == name))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = endpoint.clone();
    url.set_query(None);
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    url
}
