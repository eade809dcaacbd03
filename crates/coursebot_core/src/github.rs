//! The upstream GitHub API seam.
//!
//! Dispatch handlers talk to GitHub through [`OrgApi`] so the pipeline can be
//! exercised without the network; the production implementation lives in the
//! `github_client` crate.

use async_trait::async_trait;

/// An upstream call that did not succeed.
///
/// Carries the HTTP status (when one was received) and the response body or
/// transport error text, so the hook report can surface the rejecting call's
/// diagnostics verbatim.
#[derive(Debug, Clone, thiserror::Error)]
#[error("upstream call failed{}: {detail}", status_suffix(.status))]
pub struct UpstreamError {
    /// Status code returned by GitHub, absent for transport failures.
    pub status: Option<u16>,
    /// Response body or error text for operator diagnostics.
    pub detail: String,
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {code}"),
        None => String::new(),
    }
}

/// Administrative operations against the course organization.
///
/// Implementations are expected to be idempotent: each method expresses a
/// desired end state and may be invoked again for a redelivered event.
#[async_trait]
pub trait OrgApi: Send + Sync {
    /// Grants `team_slug` the given permission on `repository`.
    async fn grant_team_permission(
        &self,
        team_slug: &str,
        repository: &str,
        permission: &str,
    ) -> Result<(), UpstreamError>;

    /// Applies the course branch protection rules to `branch` of `repository`:
    /// required pull-request reviews plus a strict required status check on
    /// `status_context`.
    async fn protect_branch(
        &self,
        repository: &str,
        branch: &str,
        status_context: &str,
    ) -> Result<(), UpstreamError>;

    /// Disables squash and rebase merges on `repository`.
    async fn restrict_merge_strategies(&self, repository: &str) -> Result<(), UpstreamError>;

    /// Creates a commit status for `sha` on `repository`.
    async fn create_commit_status(
        &self,
        repository: &str,
        sha: &str,
        state: &str,
        description: &str,
        context: &str,
    ) -> Result<(), UpstreamError>;

    /// Renames the team identified by `team_slug`, preserving its description
    /// and privacy.
    async fn rename_team(
        &self,
        team_slug: &str,
        new_name: &str,
        description: Option<&str>,
        privacy: Option<&str>,
    ) -> Result<(), UpstreamError>;
}
