//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides the concrete [`OrgApi`] implementation used by the
//! webhook pipeline: a thin client authenticated with a personal access token
//! that performs the handful of organization administration calls the bot
//! needs. Every call either succeeds or surfaces the rejecting response's
//! status and body as an [`UpstreamError`] for the hook report.

use async_trait::async_trait;
use coursebot_core::{OrgApi, UpstreamError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, warn};

pub mod branch_protection;
pub mod commit_status;
pub mod repository;
pub mod team;

pub use branch_protection::BranchProtection;
pub use commit_status::CommitStatus;
pub use repository::MergeSettings;
pub use team::{TeamPermission, TeamUpdate};

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

const GITHUB_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// A client for the GitHub REST API, scoped to one organization.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
    api_base: String,
    organization: String,
}

impl GitHubClient {
    /// Creates a client for `organization` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(token: &str, organization: &str) -> Result<Self, reqwest::Error> {
        Self::with_api_base(token, organization, GITHUB_API_URL)
    }

    /// Creates a client that talks to `api_base` instead of the public
    /// GitHub API. Used for GitHub Enterprise installations and tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_api_base(
        token: &str,
        organization: &str,
        api_base: &str,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static("coursebot/0.1"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            token: token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            organization: organization.to_string(),
        })
    }

    /// Sends one JSON request and maps any non-2xx response (or transport
    /// failure) to an [`UpstreamError`] carrying the response diagnostics.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), UpstreamError> {
        let url = format!("{}{path}", self.api_base);

        let response = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await
            .map_err(|err| UpstreamError {
                status: None,
                detail: err.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(%method, path, status = status.as_u16(), "GitHub call succeeded");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        warn!(%method, path, status = status.as_u16(), "GitHub call rejected");
        Err(UpstreamError {
            status: Some(status.as_u16()),
            detail,
        })
    }
}

#[async_trait]
impl OrgApi for GitHubClient {
    async fn grant_team_permission(
        &self,
        team_slug: &str,
        repository: &str,
        permission: &str,
    ) -> Result<(), UpstreamError> {
        let org = &self.organization;
        self.send(
            Method::PUT,
            &format!("/orgs/{org}/teams/{team_slug}/repos/{org}/{repository}"),
            &TeamPermission {
                permission: permission.to_string(),
            },
        )
        .await
    }

    async fn protect_branch(
        &self,
        repository: &str,
        branch: &str,
        status_context: &str,
    ) -> Result<(), UpstreamError> {
        let org = &self.organization;
        self.send(
            Method::PUT,
            &format!("/repos/{org}/{repository}/branches/{branch}/protection"),
            &BranchProtection::course_default(status_context),
        )
        .await
    }

    async fn restrict_merge_strategies(&self, repository: &str) -> Result<(), UpstreamError> {
        let org = &self.organization;
        self.send(
            Method::PATCH,
            &format!("/repos/{org}/{repository}"),
            &MergeSettings::merge_commits_only(),
        )
        .await
    }

    async fn create_commit_status(
        &self,
        repository: &str,
        sha: &str,
        state: &str,
        description: &str,
        context: &str,
    ) -> Result<(), UpstreamError> {
        let org = &self.organization;
        self.send(
            Method::POST,
            &format!("/repos/{org}/{repository}/statuses/{sha}"),
            &CommitStatus {
                state: state.to_string(),
                target_url: None,
                description: description.to_string(),
                context: context.to_string(),
            },
        )
        .await
    }

    async fn rename_team(
        &self,
        team_slug: &str,
        new_name: &str,
        description: Option<&str>,
        privacy: Option<&str>,
    ) -> Result<(), UpstreamError> {
        let org = &self.organization;
        self.send(
            Method::PATCH,
            &format!("/orgs/{org}/teams/{team_slug}"),
            &TeamUpdate {
                name: new_name.to_string(),
                description: description.map(str::to_string),
                privacy: privacy.map(str::to_string),
            },
        )
        .await
    }
}
