//! Durable forwarding of raw webhook payloads.
//!
//! Authenticated, in-scope payloads are persisted under a generated name that
//! embeds the originating repository (`{repository}_{uuid}.json`), and a
//! delivery task referencing that name is enqueued. A worker later resolves
//! the repository from the name alone, looks up the currently registered
//! destination, and POSTs the stored bytes there.
//!
//! Deletion of the stored payload is the sole record of completion. The
//! contract offered to destinations is at-least-once: a crash between a
//! successful POST and the delete means the payload is posted again, and a
//! task re-presented after the delete is a harmless no-op.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::registration::RegistrationStore;

#[cfg(test)]
#[path = "forwarder_tests.rs"]
mod tests;

/// Content type recorded for staged payloads.
const PAYLOAD_CONTENT_TYPE: &str = "application/json";

/// A stored raw payload: immutable bytes plus their content type.
#[derive(Debug, Clone)]
pub struct StoredPayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// One unit of delivery work presented by the queue.
///
/// `attempt` is the queue's own delivery count, starting at 1; the queue
/// increments it each time a failed task is re-presented.
#[derive(Debug, Clone)]
pub struct DeliveryTask {
    pub name: String,
    pub attempt: u32,
}

/// Durable storage for raw payloads, keyed by generated name.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    async fn put(&self, name: &str, payload: StoredPayload);
    async fn get(&self, name: &str) -> Option<StoredPayload>;
    async fn delete(&self, name: &str);
}

/// At-least-once delivery queue of payload names.
#[async_trait]
pub trait DeliveryQueue: Send + Sync {
    /// Enqueues a first-attempt task for the named payload.
    async fn enqueue(&self, name: &str);

    /// Next task to work on, or `None` once the queue has shut down.
    async fn next_task(&self) -> Option<DeliveryTask>;

    /// Re-presents a failed task later, with its attempt count incremented.
    async fn retry(&self, task: DeliveryTask);
}

/// How one presentation of a delivery task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Destination returned 2xx; payload deleted.
    Delivered,
    /// The payload no longer exists: a duplicate presentation of a task that
    /// already completed. No-op.
    AlreadyGone,
    /// No destination registered for the repository; payload discarded.
    Unregistered,
    /// Attempt ceiling exceeded; payload deleted without another attempt.
    Abandoned,
    /// Transport failure, timeout, or non-2xx; the task should be
    /// re-presented.
    Retry,
}

/// Failure to construct the forwarder.
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("failed to build the delivery HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Generates the stored name for a payload from `repository`.
///
/// The repository is recoverable from the name alone (everything before the
/// last `_`), so no side index is needed.
fn payload_name(repository: &str) -> String {
    format!("{repository}_{}.json", Uuid::new_v4())
}

/// Recovers the registration key from a stored payload name.
///
/// The uuid segment never contains `_`, so splitting on the last one leaves
/// the repository intact even when its own name contains underscores.
pub fn repository_for(name: &str) -> Option<String> {
    match name.rsplit_once('_') {
        Some((repository, _)) if !repository.is_empty() => Some(repository.to_lowercase()),
        _ => None,
    }
}

/// Persists payloads and re-delivers them to registered destinations.
pub struct Forwarder {
    store: Arc<dyn PayloadStore>,
    queue: Arc<dyn DeliveryQueue>,
    registrations: Arc<dyn RegistrationStore>,
    http: reqwest::Client,
    max_attempts: u32,
}

impl Forwarder {
    /// Builds a forwarder whose destination POSTs are bounded by `timeout`
    /// and whose delivery attempts are capped at `max_attempts`.
    pub fn new(
        store: Arc<dyn PayloadStore>,
        queue: Arc<dyn DeliveryQueue>,
        registrations: Arc<dyn RegistrationStore>,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<Self, ForwarderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            store,
            queue,
            registrations,
            http,
            max_attempts,
        })
    }

    /// Persists `bytes` for `repository` and enqueues its delivery.
    ///
    /// Returns the generated payload name. Delivery itself is asynchronous;
    /// the caller does not wait for it.
    pub async fn stage(&self, repository: &str, bytes: &[u8]) -> String {
        let name = payload_name(repository);
        self.store
            .put(
                &name,
                StoredPayload {
                    bytes: bytes.to_vec(),
                    content_type: PAYLOAD_CONTENT_TYPE.to_string(),
                },
            )
            .await;
        self.queue.enqueue(&name).await;
        debug!(name, repository, "staged payload for forwarding");
        name
    }

    /// Works one presentation of a delivery task.
    ///
    /// Deleting the stored payload is strictly the last step on success, so
    /// an interruption anywhere earlier leaves the payload in place for the
    /// queue's redelivery to pick up.
    pub async fn deliver(&self, task: &DeliveryTask) -> DeliveryOutcome {
        if task.attempt > self.max_attempts {
            warn!(
                name = %task.name,
                attempt = task.attempt,
                "delivery ceiling exceeded; abandoning payload"
            );
            self.store.delete(&task.name).await;
            return DeliveryOutcome::Abandoned;
        }

        let Some(repository) = repository_for(&task.name) else {
            warn!(name = %task.name, "stored name has no repository prefix; discarding");
            self.store.delete(&task.name).await;
            return DeliveryOutcome::Unregistered;
        };

        let Some(payload) = self.store.get(&task.name).await else {
            debug!(name = %task.name, "payload already delivered; nothing to do");
            return DeliveryOutcome::AlreadyGone;
        };

        // Registration is optional; no destination means the payload is
        // silently discarded, not an error.
        let Some(url) = self.registrations.get(&repository).await else {
            debug!(name = %task.name, repository, "no registration; discarding payload");
            self.store.delete(&task.name).await;
            return DeliveryOutcome::Unregistered;
        };

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, payload.content_type.clone())
            .body(payload.bytes.clone())
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!(name = %task.name, repository, url, "payload delivered");
                self.store.delete(&task.name).await;
                DeliveryOutcome::Delivered
            }
            Ok(response) => {
                warn!(
                    name = %task.name,
                    url,
                    status = response.status().as_u16(),
                    attempt = task.attempt,
                    "destination rejected payload"
                );
                DeliveryOutcome::Retry
            }
            Err(error) => {
                // Timeouts land here and are treated like any transport
                // failure.
                warn!(
                    name = %task.name,
                    url,
                    attempt = task.attempt,
                    error = %error,
                    "failed to reach destination"
                );
                DeliveryOutcome::Retry
            }
        }
    }

    /// Consumes the queue until it shuts down.
    ///
    /// Retryable failures are handed back to the queue; a shutdown mid-flight
    /// abandons the in-progress delivery without deleting its payload, so a
    /// later worker retries it.
    pub async fn run_worker(&self) {
        while let Some(task) = self.queue.next_task().await {
            if self.deliver(&task).await == DeliveryOutcome::Retry {
                self.queue.retry(task).await;
            }
        }
        debug!("delivery queue closed; worker exiting");
    }
}
