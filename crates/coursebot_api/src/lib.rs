//! CourseBot HTTP host.
//!
//! This crate exposes the webhook intake and registration endpoints over
//! axum and wires them to the processing pipeline in `coursebot_core`. It
//! handles HTTP translation only:
//!
//! - raw body and signature header extraction for the webhook endpoint
//! - registration upserts and their staged test delivery
//! - mapping each [`HookReport`](coursebot_core::HookReport) disposition to
//!   an HTTP status
//!
//! Dispatch decisions and delivery semantics live in `coursebot_core`; this
//! crate must never grow business logic of its own.

use std::sync::Arc;

use coursebot_core::{Forwarder, HookPipeline, RegistrationStore};

pub mod errors;
pub mod handlers;
pub mod routes;
pub mod server;

pub use errors::ApiError;
pub use server::{ApiConfig, ApiServer};

/// Default API port
pub const DEFAULT_PORT: u16 = 8080;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Webhook processing pipeline.
    pub pipeline: Arc<HookPipeline>,
    /// Payload staging for registration test deliveries.
    pub forwarder: Arc<Forwarder>,
    /// Per-repository forwarding destinations.
    pub registrations: Arc<dyn RegistrationStore>,
}
