//! Inquiry submission endpoint.
//!
//! The body is parsed here rather than through the `Json` extractor so that
//! every malformed request gets the same JSON failure shape as other errors.

use axum::{Json, body::Bytes, extract::State};
use czqt_core::ContactResponse;
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Relay a customer inquiry to the sales inbox.
///
/// POST /api/contact
///
/// Answers 200 once the inquiry is validated, whether or not the
/// notification email went out.
#[instrument(skip_all, fields(body_len = body.len()))]
pub async fn submit_inquiry(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ContactResponse>> {
    let outcome = state.relay().handle(&body).await?;

    if !outcome.delivered {
        tracing::debug!("Responding success without delivered notification");
    }

    Ok(Json(ContactResponse::accepted(&outcome.record)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
        response::Response,
    };
    use czqt_core::{ACCEPTED_MESSAGE, FAILURE_MESSAGE, MISSING_FIELDS_MESSAGE};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::routes::test_support::{StubProvider, app_with};

    fn post(body: impl Into<Body>) -> Request<Body> {
        Request::post("/api/contact")
            .header(CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn li_wei() -> Value {
        json!({
            "name": "Li Wei",
            "email": "li@acme.com",
            "phone": "+86 139 0000 0000",
            "requirements": "Need D10 4-flute for HRC62",
            "timestamp": "2025-03-14T08:30:00.000Z"
        })
    }

    #[tokio::test]
    async fn test_accepts_inquiry_without_company() {
        let provider = StubProvider::new(false);
        let response = app_with(Arc::clone(&provider))
            .oneshot(post(li_wei().to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], ACCEPTED_MESSAGE);
        assert_eq!(body["customerInfo"]["name"], "Li Wei");
        assert_eq!(body["customerInfo"]["email"], "li@acme.com");
        assert_eq!(body["customerInfo"]["phone"], "+86 139 0000 0000");
        assert_eq!(body["customerInfo"]["company"], "Not provided");
        assert_eq!(
            body["customerInfo"]["requirements"],
            "Need D10 4-flute for HRC62"
        );

        let content = body["emailContent"].as_str().unwrap();
        assert!(content.contains("Li Wei"));
        assert!(content.contains("li@acme.com"));
        assert!(content.contains("+86 139 0000 0000"));
        assert!(content.contains("Need D10 4-flute for HRC62"));
        assert!(content.contains("Company: Not provided"));

        assert_eq!(provider.calls(), 1);
        let sent = provider.sent.lock().unwrap();
        assert_eq!(sent[0].to, "linda@czqttools.com");
    }

    #[tokio::test]
    async fn test_rejects_missing_requirements() {
        let provider = StubProvider::new(false);
        let mut inquiry = li_wei();
        inquiry.as_object_mut().unwrap().remove("requirements");

        let response = app_with(Arc::clone(&provider))
            .oneshot(post(inquiry.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], MISSING_FIELDS_MESSAGE);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejects_blank_required_fields() {
        for field in ["name", "email", "phone", "requirements"] {
            let provider = StubProvider::new(false);
            let mut inquiry = li_wei();
            inquiry[field] = json!("   ");

            let response = app_with(Arc::clone(&provider))
                .oneshot(post(inquiry.to_string()))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "field {field}");
            assert_eq!(provider.calls(), 0, "field {field}");
        }
    }

    #[tokio::test]
    async fn test_provider_failure_still_succeeds() {
        let provider = StubProvider::new(true);
        let response = app_with(Arc::clone(&provider))
            .oneshot(post(li_wei().to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_company_echoed_when_given() {
        let provider = StubProvider::new(false);
        let mut inquiry = li_wei();
        inquiry["company"] = json!("Acme Precision");

        let response = app_with(provider)
            .oneshot(post(inquiry.to_string()))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["customerInfo"]["company"], "Acme Precision");
        assert!(
            body["emailContent"]
                .as_str()
                .unwrap()
                .contains("Company: Acme Precision")
        );
    }

    #[tokio::test]
    async fn test_values_relayed_verbatim() {
        let provider = StubProvider::new(false);
        let mut inquiry = li_wei();
        inquiry["name"] = json!("Li Wei ");
        inquiry["company"] = json!("  Acme  ");

        let response = app_with(Arc::clone(&provider))
            .oneshot(post(inquiry.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["customerInfo"]["name"], "Li Wei ");
        assert_eq!(body["customerInfo"]["company"], "  Acme  ");
        let content = body["emailContent"].as_str().unwrap();
        assert!(content.contains("Name: Li Wei \n"));
        assert!(content.contains("Company:   Acme  \n"));

        let sent = provider.sent.lock().unwrap();
        assert!(sent[0].body.contains("Name: Li Wei \n"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_internal_error() {
        let provider = StubProvider::new(false);
        let response = app_with(Arc::clone(&provider))
            .oneshot(post("{\"name\": \"Li Wei\""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], FAILURE_MESSAGE);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_internal_error() {
        let provider = StubProvider::new(false);
        let mut inquiry = li_wei();
        inquiry["phone"] = json!(13_900_000_000_u64);

        let response = app_with(provider)
            .oneshot(post(inquiry.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_non_utf8_body_is_internal_error() {
        let provider = StubProvider::new(false);
        let response = app_with(provider)
            .oneshot(post(vec![b'{', b'"', 0xff, 0xfe, b'"', b'}']))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let provider = StubProvider::new(false);
        let response = app_with(provider)
            .oneshot(post(li_wei().to_string()))
            .await
            .unwrap();

        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()["cache-control"], "no-store");
    }
}
