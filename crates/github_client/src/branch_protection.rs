//! Branch protection wire types.
//!
//! These mirror the request body of GitHub's "update branch protection"
//! endpoint (`PUT /repos/{owner}/{repo}/branches/{branch}/protection`).

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "branch_protection_tests.rs"]
mod tests;

/// Request body for updating branch protection on a single branch.
///
/// The endpoint requires every top-level field to be present, including the
/// nullable `restrictions`, so none of these are optional on the wire.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BranchProtection {
    /// Status checks that must pass before merging.
    pub required_status_checks: RequiredStatusChecks,
    /// Whether protection rules also apply to repository administrators.
    pub enforce_admins: bool,
    /// Pull request review requirements.
    pub required_pull_request_reviews: RequiredPullRequestReviews,
    /// Push restrictions; `None` serializes as `null` (no restrictions).
    pub restrictions: Option<Restrictions>,
    /// Whether the branch history must be linear.
    pub required_linear_history: bool,
    /// Whether force pushes are permitted.
    pub allow_force_pushes: bool,
    /// Whether the branch may be deleted.
    pub allow_deletions: bool,
    /// Whether creation of matching branches is blocked.
    pub block_creations: bool,
    /// Whether all review conversations must be resolved before merging.
    pub required_conversation_resolution: bool,
}

/// Status checks required before a pull request can merge.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RequiredStatusChecks {
    /// Require the branch to be up to date with its base before merging.
    pub strict: bool,
    /// Status contexts that must report success.
    pub contexts: Vec<String>,
}

/// Pull request review requirements for a protected branch.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RequiredPullRequestReviews {
    pub dismissal_restrictions: DismissalRestrictions,
    pub dismiss_stale_reviews: bool,
    pub require_code_owner_reviews: bool,
    pub required_approving_review_count: u32,
    pub bypass_pull_request_allowances: BypassPullRequestAllowances,
}

/// Who may dismiss pull request reviews. Empty means nobody is singled out.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DismissalRestrictions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<String>,
}

/// Who may bypass pull request requirements entirely.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct BypassPullRequestAllowances {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<String>,
}

/// Who may push to a protected branch.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Restrictions {
    pub users: Vec<String>,
    pub teams: Vec<String>,
    pub apps: Vec<String>,
}

impl BranchProtection {
    /// The protection applied to every course repository's default branch:
    /// pull request reviews are required (with default thresholds) and the
    /// given status context must pass on an up-to-date branch.
    pub fn course_default(status_context: &str) -> Self {
        Self {
            required_status_checks: RequiredStatusChecks {
                strict: true,
                contexts: vec![status_context.to_string()],
            },
            enforce_admins: false,
            required_pull_request_reviews: RequiredPullRequestReviews::default(),
            restrictions: None,
            required_linear_history: false,
            allow_force_pushes: false,
            allow_deletions: false,
            block_creations: false,
            required_conversation_resolution: false,
        }
    }
}
