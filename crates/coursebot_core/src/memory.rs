//! In-process payload store and delivery queue.
//!
//! These back single-process deployments and the test suite. They honor the
//! same contracts a cloud blob/queue pair would: the queue is at-least-once
//! with single-consumer-at-a-time presentation per task, and redelivery of a
//! failed task carries an incremented attempt count after a visibility delay.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::forwarder::{DeliveryQueue, DeliveryTask, PayloadStore, StoredPayload};

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

/// In-memory payload store.
#[derive(Default)]
pub struct MemoryPayloadStore {
    payloads: Mutex<HashMap<String, StoredPayload>>,
}

impl MemoryPayloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads currently held. Used by tests and health output.
    pub fn len(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PayloadStore for MemoryPayloadStore {
    async fn put(&self, name: &str, payload: StoredPayload) {
        self.payloads
            .lock()
            .unwrap()
            .insert(name.to_string(), payload);
    }

    async fn get(&self, name: &str) -> Option<StoredPayload> {
        self.payloads.lock().unwrap().get(name).cloned()
    }

    async fn delete(&self, name: &str) {
        self.payloads.lock().unwrap().remove(name);
    }
}

struct QueueInner {
    tasks: Mutex<VecDeque<DeliveryTask>>,
    notify: Notify,
    closed: AtomicBool,
}

impl QueueInner {
    fn push(&self, task: DeliveryTask) {
        self.tasks.lock().unwrap().push_back(task);
        self.notify.notify_waiters();
    }
}

/// In-memory at-least-once delivery queue.
pub struct MemoryQueue {
    inner: Arc<QueueInner>,
    redelivery_delay: Duration,
}

impl MemoryQueue {
    /// A queue whose failed tasks become visible again after `redelivery_delay`.
    pub fn new(redelivery_delay: Duration) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                tasks: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
                closed: AtomicBool::new(false),
            }),
            redelivery_delay,
        }
    }

    /// Closes the queue; workers drain to `None` once pending tasks are gone.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryQueue for MemoryQueue {
    async fn enqueue(&self, name: &str) {
        self.inner.push(DeliveryTask {
            name: name.to_string(),
            attempt: 1,
        });
    }

    async fn next_task(&self) -> Option<DeliveryTask> {
        loop {
            let notified = self.inner.notify.notified();
            if let Some(task) = self.inner.tasks.lock().unwrap().pop_front() {
                return Some(task);
            }
            if self.inner.closed.load(Ordering::SeqCst) {
                return None;
            }
            notified.await;
        }
    }

    async fn retry(&self, task: DeliveryTask) {
        let inner = Arc::clone(&self.inner);
        let delay = self.redelivery_delay;
        // Visibility delay before the task is presented again.
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.push(DeliveryTask {
                attempt: task.attempt + 1,
                ..task
            });
        });
    }
}
