//! CourseBot API Server
//!
//! Main binary for running the webhook host in production or development.
//!
//! # Environment Variables
//!
//! - `GITHUB_TOKEN`: Token used for organization administration (required)
//! - `GITHUB_ORGANIZATION`, `ADMIN_TEAM_SLUG`, `COURSE_REPO_MARKER`,
//!   `WEBHOOK_SECRET` and friends: see `coursebot_core::Settings`
//! - `API_PORT`: Port to listen on (default: 8080)
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use coursebot_api::{ApiConfig, ApiServer, AppState, DEFAULT_PORT};
use coursebot_core::{
    Forwarder, HookPipeline, MemoryPayloadStore, MemoryQueue, MemoryRegistrationStore,
    RegistrationStore, Settings,
};
use github_client::GitHubClient;

/// Delay before a failed delivery becomes visible to the worker again.
const REDELIVERY_DELAY: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    // Load configuration from environment
    let settings = Settings::from_env().context("Failed to load settings")?;
    let token = env::var("GITHUB_TOKEN").context("GITHUB_TOKEN is required")?;

    let config = ApiConfig {
        port: env::var("API_PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .context("Invalid API_PORT")?,
        host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
    };

    let github = GitHubClient::new(&token, &settings.organization)
        .context("Failed to build GitHub client")?;

    // In-process adapters; the traits allow durable backends to slot in.
    let store = Arc::new(MemoryPayloadStore::new());
    let queue = Arc::new(MemoryQueue::new(REDELIVERY_DELAY));
    let registrations: Arc<dyn RegistrationStore> = Arc::new(MemoryRegistrationStore::new());

    let forwarder = Arc::new(
        Forwarder::new(
            store,
            queue.clone(),
            registrations.clone(),
            settings.forward_timeout,
            settings.max_delivery_attempts,
        )
        .context("Failed to build forwarder")?,
    );

    let pipeline = Arc::new(HookPipeline::new(settings, Arc::new(github), forwarder.clone()));
    let state = AppState {
        pipeline,
        forwarder,
        registrations,
    };

    // The server owns the delivery worker: it spawns it alongside the
    // listener and drains it after graceful shutdown.
    tracing::info!("Starting CourseBot API server");
    ApiServer::new(config, state, queue).serve().await
}
