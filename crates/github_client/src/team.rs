//! Team administration wire types.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "team_tests.rs"]
mod tests;

/// Request body for granting a team access to a repository
/// (`PUT /orgs/{org}/teams/{team_slug}/repos/{owner}/{repo}`).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TeamPermission {
    /// Permission level, e.g. `pull`, `push`, or `admin`.
    pub permission: String,
}

/// Request body for `PATCH /orgs/{org}/teams/{team_slug}`.
///
/// `description` and `privacy` are echoed back from the inbound event so the
/// update only changes the team's name.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TeamUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
}
