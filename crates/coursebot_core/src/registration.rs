//! Per-repository forwarding registrations.
//!
//! A registration maps a repository to the URL its webhook payloads should be
//! re-delivered to. Keys are normalized to lower case and writes are blind
//! overwrites, so concurrent registrations resolve last-write-wins with no
//! read-modify-write race.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;

/// Normalizes a repository name to its registration key.
pub fn registration_key(repository: &str) -> String {
    repository.to_lowercase()
}

/// Key/value store of forwarding destinations, one per repository.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Returns the destination URL registered for the repository, if any.
    async fn get(&self, repository: &str) -> Option<String>;

    /// Registers or replaces the destination URL for the repository.
    async fn put(&self, repository: &str, url: &str);
}

/// In-process registration store.
///
/// The store interface is deliberately small so a durable table can sit
/// behind it; this implementation backs single-process deployments and the
/// test suite.
#[derive(Default)]
pub struct MemoryRegistrationStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationStore for MemoryRegistrationStore {
    async fn get(&self, repository: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(&registration_key(repository))
            .cloned()
    }

    async fn put(&self, repository: &str, url: &str) {
        self.entries
            .write()
            .await
            .insert(registration_key(repository), url.to_string());
    }
}
