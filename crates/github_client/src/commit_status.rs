//! Commit status wire types.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "commit_status_tests.rs"]
mod tests;

/// Request body for `POST /repos/{owner}/{repo}/statuses/{sha}`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CommitStatus {
    /// One of `error`, `failure`, `pending`, or `success`.
    pub state: String,
    /// Link shown next to the status, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// Short human-readable summary.
    pub description: String,
    /// Label distinguishing this status from other systems.
    pub context: String,
}
