//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! POST /api/contact   - Relay an inquiry to the sales inbox
//! GET  /thank-you     - Confirmation page the client redirects to
//! GET  /health        - Liveness check
//! GET  /*             - Landing page export (when SITE_STATIC_DIR is set)
//! ```

pub mod contact;
pub mod pages;

use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::{REQUEST_ID_HEADER, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create the site routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/contact", post(contact::submit_inquiry))
        .route("/thank-you", get(pages::thank_you))
        .route("/health", get(pages::health))
}

/// Build the full application with its middleware stack.
///
/// Sentry layers are not included; the binary adds them outermost.
pub fn app(state: AppState) -> Router {
    let mut router = routes();

    if let Some(dir) = &state.config().static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router = router.layer(middleware::from_fn(security_headers_middleware));

    if let Some(cors) = state.config().cors_origin.as_deref().and_then(cors_layer) {
        router = router.layer(cors);
    }

    router
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// CORS for a landing page served from another origin.
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let Ok(origin) = HeaderValue::from_str(origin) else {
        tracing::warn!(origin, "Ignoring invalid SITE_CORS_ORIGIN");
        return None;
    };

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)]),
    )
}
