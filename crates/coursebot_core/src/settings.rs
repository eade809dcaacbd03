//! Runtime configuration for the webhook pipeline.
//!
//! All tenancy constants (organization name, admin team slug, course marker)
//! are injected here at startup rather than compiled in, so tests and other
//! deployments can substitute them.

use std::env;
use std::time::Duration;

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// Default ceiling on delivery attempts before a payload is abandoned.
pub const DEFAULT_MAX_DELIVERY_ATTEMPTS: u32 = 3;

/// Default timeout for the outbound forward to a registered destination.
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(10);

/// Sentinel secret value that turns signature verification off.
const UNVERIFIED_SENTINEL: &str = "ignore";

/// How inbound webhook deliveries are authenticated.
#[derive(Debug, Clone)]
pub enum WebhookSecret {
    /// HMAC-SHA256 verification against this shared secret.
    Shared(String),
    /// Verification disabled. Only reachable when the operator opted in with
    /// `ALLOW_UNVERIFIED_WEBHOOKS=true`; every unverified request is logged.
    Disabled,
}

/// Errors raised while loading [`Settings`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required environment variable is absent or empty.
    #[error("missing required environment variable {0}")]
    MissingVariable(&'static str),

    /// A variable is present but cannot be parsed.
    #[error("invalid value for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        reason: String,
    },

    /// The `ignore` secret sentinel was used without the explicit opt-in.
    #[error("WEBHOOK_SECRET=ignore requires ALLOW_UNVERIFIED_WEBHOOKS=true; refusing to start unverified")]
    UnverifiedNotAllowed,
}

/// Immutable pipeline settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The single GitHub organization this deployment serves.
    pub organization: String,

    /// Slug of the administrative team granted access to new repositories.
    /// Team-rename events for this team are skipped.
    pub admin_team_slug: String,

    /// Substring a repository name must contain to be in scope.
    pub course_repo_marker: String,

    /// Context string used for required status checks and commit statuses.
    pub status_context: String,

    /// Branch that receives protection on newly created repositories.
    pub default_branch: String,

    /// Shared secret for inbound webhook signatures.
    pub webhook_secret: WebhookSecret,

    /// Upper bound on a single forward POST to a registered destination.
    pub forward_timeout: Duration,

    /// Delivery attempts ceiling; beyond it the payload is abandoned.
    pub max_delivery_attempts: u32,
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// # Recognized variables
    ///
    /// - `GITHUB_ORGANIZATION` (required)
    /// - `ADMIN_TEAM_SLUG` (required)
    /// - `COURSE_REPO_MARKER` (required)
    /// - `WEBHOOK_SECRET` (required; the sentinel `ignore` disables
    ///   verification and is refused unless `ALLOW_UNVERIFIED_WEBHOOKS=true`)
    /// - `STATUS_CONTEXT` (default `coursebot`)
    /// - `DEFAULT_BRANCH` (default `master`)
    /// - `FORWARD_TIMEOUT_SECS` (default 10)
    /// - `MAX_DELIVERY_ATTEMPTS` (default 3)
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a required variable is missing, a value
    /// fails to parse, or the unverified sentinel is used without the opt-in.
    pub fn from_env() -> Result<Self, SettingsError> {
        let organization = require("GITHUB_ORGANIZATION")?;
        let admin_team_slug = require("ADMIN_TEAM_SLUG")?;
        let course_repo_marker = require("COURSE_REPO_MARKER")?;

        let secret = require("WEBHOOK_SECRET")?;
        let webhook_secret = if secret == UNVERIFIED_SENTINEL {
            let allowed = env::var("ALLOW_UNVERIFIED_WEBHOOKS")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false);
            if !allowed {
                return Err(SettingsError::UnverifiedNotAllowed);
            }
            tracing::warn!(
                "webhook signature verification is DISABLED; do not run this configuration in production"
            );
            WebhookSecret::Disabled
        } else {
            WebhookSecret::Shared(secret)
        };

        let forward_timeout = match env::var("FORWARD_TIMEOUT_SECS") {
            Ok(value) => Duration::from_secs(parse_u64("FORWARD_TIMEOUT_SECS", &value)?),
            Err(_) => DEFAULT_FORWARD_TIMEOUT,
        };

        let max_delivery_attempts = match env::var("MAX_DELIVERY_ATTEMPTS") {
            Ok(value) => parse_u64("MAX_DELIVERY_ATTEMPTS", &value)? as u32,
            Err(_) => DEFAULT_MAX_DELIVERY_ATTEMPTS,
        };

        Ok(Self {
            organization,
            admin_team_slug,
            course_repo_marker,
            status_context: env::var("STATUS_CONTEXT").unwrap_or_else(|_| "coursebot".to_string()),
            default_branch: env::var("DEFAULT_BRANCH").unwrap_or_else(|_| "master".to_string()),
            webhook_secret,
            forward_timeout,
            max_delivery_attempts,
        })
    }
}

#[cfg(test)]
impl Settings {
    /// Fixed settings shared by the unit tests in this crate.
    pub(crate) fn for_tests() -> Self {
        Self {
            organization: "Example-University".to_string(),
            admin_team_slug: "course-admins".to_string(),
            course_repo_marker: "cmps383".to_string(),
            status_context: "coursebot".to_string(),
            default_branch: "master".to_string(),
            webhook_secret: WebhookSecret::Shared("it's a secret to everybody".to_string()),
            forward_timeout: Duration::from_secs(2),
            max_delivery_attempts: 3,
        }
    }
}

fn require(name: &'static str) -> Result<String, SettingsError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SettingsError::MissingVariable(name)),
    }
}

fn parse_u64(name: &'static str, value: &str) -> Result<u64, SettingsError> {
    value
        .parse::<u64>()
        .map_err(|e| SettingsError::InvalidValue {
            name,
            reason: e.to_string(),
        })
}
