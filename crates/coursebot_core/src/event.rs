//! Event classification.
//!
//! GitHub webhook bodies do not carry a reliable type discriminator in the
//! payload itself, so the classifier infers one structurally: the first
//! top-level key whose value is a JSON object names the kind of thing the
//! event concerns (`repository`, `check_suite`, `team`, ...). The scan is
//! first-match in document order, which is why `serde_json` is built with
//! `preserve_order` in this workspace.

use serde::Deserialize;

use crate::settings::Settings;

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

/// Repository fragment of an event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: Option<String>,
    pub full_name: Option<String>,
}

/// Organization fragment of an event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub login: Option<String>,
}

/// Check-suite fragment of an event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckSuite {
    /// Conclusion of the suite (`success`, `failure`, ...).
    pub conclusion: Option<String>,
    /// The commit SHA the suite ran against.
    pub after: Option<String>,
}

/// Team fragment of an event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<String>,
}

/// The strongly shaped view of an event body.
///
/// Only the fragments the handlers need are modeled; everything else in the
/// body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    pub repository: Option<Repository>,
    pub organization: Option<Organization>,
    pub check_suite: Option<CheckSuite>,
    pub team: Option<Team>,
}

/// A classified, in-scope webhook event.
#[derive(Debug)]
pub struct Event {
    /// The `action` string, when present. Team renames arrive without one.
    pub action: Option<String>,
    /// The `scope` string, when present.
    pub scope: Option<String>,
    /// First object-valued top-level key, excluding `action` and `scope`.
    pub target_type: String,
    /// The raw JSON object recorded for `target_type`.
    pub target: serde_json::Value,
    /// Name of the repository the event concerns. Always present; events
    /// without one are skipped before an `Event` is built.
    pub repository: String,
    /// Typed re-parse of the full body.
    pub payload: EventPayload,
}

/// Why a syntactically valid event was not routed.
///
/// Skips are benign: the request is acknowledged with a 200 and nothing is
/// dispatched or forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The request carried no body (or only whitespace).
    EmptyBody,
    /// No top-level key held a JSON object, so there is nothing to target.
    NoTargetType,
    /// The payload has no repository name to act on.
    MissingRepository,
    /// The repository name lacks the configured course marker.
    OutOfScope { repository: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptyBody => write!(f, "no body"),
            SkipReason::NoTargetType => write!(f, "no target type found"),
            SkipReason::MissingRepository => write!(f, "failed to get repository information"),
            SkipReason::OutOfScope { repository } => {
                write!(f, "repository {repository} is not in scope for this course")
            }
        }
    }
}

/// Classification failures that indicate a broken or mis-routed delivery.
///
/// Unlike a [`SkipReason`], these surface as an operational error (HTTP 500).
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The body is not valid JSON, is not an object, or the typed re-parse
    /// failed.
    #[error("failed to parse event payload: {0}")]
    BadPayload(String),

    /// The event belongs to an organization this deployment does not serve.
    #[error("event organization {found:?} does not match {expected}")]
    WrongOrganization {
        expected: String,
        found: Option<String>,
    },
}

/// Result of classifying a body: either a routed [`Event`] or a benign skip.
#[derive(Debug)]
pub enum Classification {
    Routed(Event),
    Skipped(SkipReason),
}

/// Classifies raw JSON bytes into an [`Event`].
///
/// The scan over top-level keys is a single linear pass in document order:
/// string-valued `action` and `scope` are recorded, and the first
/// object-valued key (other than those two) wins the target-type slot. This
/// first-match tie-break is a deliberate contract; see the tests covering
/// payloads with several object-valued keys.
pub fn classify(body: &[u8], settings: &Settings) -> Result<Classification, ClassifyError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Classification::Skipped(SkipReason::EmptyBody));
    }

    let root: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ClassifyError::BadPayload(e.to_string()))?;
    if root.is_null() {
        return Ok(Classification::Skipped(SkipReason::EmptyBody));
    }
    let Some(entries) = root.as_object() else {
        return Err(ClassifyError::BadPayload(
            "request body is not a JSON object".to_string(),
        ));
    };

    let mut action = None;
    let mut scope = None;
    let mut target: Option<(String, serde_json::Value)> = None;

    for (key, value) in entries {
        match key.as_str() {
            "action" => {
                if let Some(text) = value.as_str() {
                    action = Some(text.to_string());
                }
            }
            "scope" => {
                if let Some(text) = value.as_str() {
                    scope = Some(text.to_string());
                }
            }
            _ => {
                if value.is_object() && target.is_none() {
                    target = Some((key.clone(), value.clone()));
                }
            }
        }
    }

    let Some((target_type, target)) = target else {
        return Ok(Classification::Skipped(SkipReason::NoTargetType));
    };

    let payload: EventPayload =
        serde_json::from_slice(body).map_err(|e| ClassifyError::BadPayload(e.to_string()))?;

    let Some(repository) = payload
        .repository
        .as_ref()
        .and_then(|r| r.name.clone())
        .filter(|name| !name.is_empty())
    else {
        return Ok(Classification::Skipped(SkipReason::MissingRepository));
    };

    let login = payload.organization.as_ref().and_then(|o| o.login.clone());
    if login.as_deref() != Some(settings.organization.as_str()) {
        return Err(ClassifyError::WrongOrganization {
            expected: settings.organization.clone(),
            found: login,
        });
    }

    if !repository.contains(&settings.course_repo_marker) {
        return Ok(Classification::Skipped(SkipReason::OutOfScope { repository }));
    }

    Ok(Classification::Routed(Event {
        action,
        scope,
        target_type,
        target,
        repository,
        payload,
    }))
}
