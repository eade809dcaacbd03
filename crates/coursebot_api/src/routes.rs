//! HTTP routing configuration
//!
//! All routes are prefixed with `/api`:
//!
//! - POST /api/hooks/github - Webhook intake
//! - PUT  /api/registrations - Registration upsert
//! - GET  /api/health - Health check

use axum::routing::{get, post, put};
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};

use crate::{handlers, AppState};

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Request timeout; webhook processing makes a handful of upstream calls,
/// each already bounded by its own client timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the complete API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new())
        .on_response(DefaultOnResponse::new());

    let api = Router::new()
        .route("/hooks/github", post(handlers::receive_hook))
        .route("/registrations", put(handlers::put_registration))
        .route("/health", get(handlers::health_check))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(trace_layer)
        .with_state(state);

    Router::new().nest("/api", api)
}
