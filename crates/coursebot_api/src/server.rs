//! HTTP server startup and lifecycle.
//!
//! [`ApiServer`] owns the pieces that must start and stop together: the
//! axum listener and the payload delivery worker. Shutdown is ordered so no
//! staged payload is stranded: the listener drains first, then the queue is
//! closed, and the worker finishes whatever deliveries are still pending
//! before the process exits.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use coursebot_core::MemoryQueue;

use crate::{routes, AppState, DEFAULT_PORT};

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,
}

impl ApiConfig {
    fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("invalid API host {:?}", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// The HTTP listener plus the delivery worker it keeps alive.
pub struct ApiServer {
    config: ApiConfig,
    state: AppState,
    queue: Arc<MemoryQueue>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: AppState, queue: Arc<MemoryQueue>) -> Self {
        Self {
            config,
            state,
            queue,
        }
    }

    /// Build the Axum router with all routes and middleware.
    pub fn router(&self) -> axum::Router {
        routes::create_router(self.state.clone())
    }

    /// Bind the configured address and run until CTRL+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured host does not parse or the address
    /// cannot be bound.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.config.bind_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!("API server listening on {addr}");

        self.run(listener, shutdown_signal()).await
    }

    /// Serve `listener` until `shutdown` resolves, then drain the delivery
    /// worker.
    async fn run(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let worker = tokio::spawn({
            let forwarder = Arc::clone(&self.state.forwarder);
            async move { forwarder.run_worker().await }
        });

        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("server error")?;

        // No new requests can stage payloads now; close the queue and let
        // the worker finish the deliveries already enqueued.
        self.queue.close();
        worker.await.context("delivery worker panicked")?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Resolves when the process receives CTRL+C (SIGINT) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "cannot listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received CTRL+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
