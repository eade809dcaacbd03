//! HTTP request handlers
//!
//! Each handler extracts HTTP request data, hands it to `coursebot_core`,
//! and translates the result back into an HTTP response. The webhook
//! endpoint returns the accumulated hook report as plain text, the same
//! lines an operator sees in the logs.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use url::Url;

use coursebot_core::{signature, HookDisposition};

use crate::errors::ApiError;
use crate::AppState;

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

/// POST /api/hooks/github
///
/// Webhook intake. The raw body is passed through untouched so signature
/// verification sees exactly the bytes GitHub signed.
pub async fn receive_hook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature_header = headers
        .get(signature::SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let report = state.pipeline.process(&body, signature_header).await;

    let status = match report.disposition() {
        HookDisposition::Handled => StatusCode::OK,
        HookDisposition::Unauthorized => StatusCode::UNAUTHORIZED,
        HookDisposition::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, report.body()).into_response()
}

/// Body of a `PUT /api/registrations` request.
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    /// Repository whose webhook payloads should be forwarded.
    pub repository: String,
    /// Destination that will receive the forwarded payloads.
    pub url: String,
}

/// PUT /api/registrations
///
/// Upserts the forwarding destination for one repository and immediately
/// stages a small test payload so the destination sees a delivery without
/// waiting for real activity.
pub async fn put_registration(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<&'static str, ApiError> {
    let repository = request.repository.trim();
    if repository.is_empty() {
        return Err(ApiError::validation("repository", "must not be empty"));
    }

    let destination = request.url.trim();
    let parsed = Url::parse(destination)
        .map_err(|err| ApiError::validation("url", err.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ApiError::validation("url", "must be an http(s) URL"));
    }

    state.registrations.put(repository, destination).await;
    info!(repository, "registration stored");

    let test_payload = json!({"test": true, "some": "value"}).to_string();
    state
        .forwarder
        .stage(repository, test_payload.as_bytes())
        .await;

    Ok("done!\n")
}

/// Body of a `GET /api/health` response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
