//! Repository settings wire types.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;

/// Partial body for `PATCH /repos/{owner}/{repo}`.
///
/// Only the merge strategy toggles are sent; GitHub leaves every omitted
/// repository setting untouched.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MergeSettings {
    pub allow_squash_merge: bool,
    pub allow_rebase_merge: bool,
}

impl MergeSettings {
    /// Leaves merge commits as the only way to land a pull request, which
    /// keeps individual contributions visible in the branch history.
    pub fn merge_commits_only() -> Self {
        Self {
            allow_squash_merge: false,
            allow_rebase_merge: false,
        }
    }
}
