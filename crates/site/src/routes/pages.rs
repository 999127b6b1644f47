//! Plain page handlers.

use axum::response::Html;

const THANK_YOU_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Thank you | CZQT Tools</title>
</head>
<body>
<main>
<h1>Thank you for your inquiry</h1>
<p>Our sales team will contact you as soon as possible.</p>
<p><a href="/">Back to home</a></p>
</main>
</body>
</html>
"#;

/// Confirmation page the submission client redirects to.
///
/// GET /thank-you
pub async fn thank_you() -> Html<&'static str> {
    Html(THANK_YOU_PAGE)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. The email provider is not probed.
pub async fn health() -> &'static str {
    "ok"
}
