//! Routing from classified events to handlers.
//!
//! The routing table is a total function over `(target_type, action)` pairs:
//! known pairs map to a [`HookAction`], everything else maps to `None`, which
//! the pipeline reports as "not handled" with a 200. Handlers never re-parse
//! raw JSON; they consume the classified [`Event`] only, and they never retry
//! upstream failures.

use tracing::{info, warn};

use crate::event::Event;
use crate::github::{OrgApi, UpstreamError};
use crate::settings::Settings;

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

/// The handlers this deployment knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// `(repository, created)`: admin team access, branch protection, merge
    /// strategy restrictions.
    SetUpRepository,
    /// `(check_suite, completed)`: commit status from the suite conclusion.
    PublishCheckOutcome,
    /// `(team, <no action>)`: rename the team after its repository.
    AlignTeamName,
}

impl std::fmt::Display for HookAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookAction::SetUpRepository => write!(f, "set up repository"),
            HookAction::PublishCheckOutcome => write!(f, "publish check outcome"),
            HookAction::AlignTeamName => write!(f, "align team name"),
        }
    }
}

/// How a handler finished.
#[derive(Debug)]
pub enum ActionOutcome {
    /// All upstream calls succeeded.
    Completed,
    /// The handler decided there was nothing to do.
    Skipped { reason: String },
    /// An upstream call was rejected; `step` names the sub-step that failed.
    UpstreamRejected {
        step: &'static str,
        error: UpstreamError,
    },
    /// The event is missing data the handler cannot proceed without.
    PreconditionFailed { reason: String },
}

/// Selects the handler for a classified event, if any.
pub fn route(event: &Event) -> Option<HookAction> {
    match (event.target_type.as_str(), event.action.as_deref()) {
        ("repository", Some("created")) => Some(HookAction::SetUpRepository),
        ("check_suite", Some("completed")) => Some(HookAction::PublishCheckOutcome),
        ("team", None) => Some(HookAction::AlignTeamName),
        _ => None,
    }
}

/// Runs the selected handler against the upstream API.
pub async fn execute(
    action: HookAction,
    event: &Event,
    settings: &Settings,
    api: &dyn OrgApi,
) -> ActionOutcome {
    info!(action = %action, repository = %event.repository, "executing hook action");
    match action {
        HookAction::SetUpRepository => set_up_repository(event, settings, api).await,
        HookAction::PublishCheckOutcome => publish_check_outcome(event, settings, api).await,
        HookAction::AlignTeamName => align_team_name(event, settings, api).await,
    }
}

async fn set_up_repository(
    event: &Event,
    settings: &Settings,
    api: &dyn OrgApi,
) -> ActionOutcome {
    if let Err(error) = api
        .grant_team_permission(&settings.admin_team_slug, &event.repository, "admin")
        .await
    {
        return ActionOutcome::UpstreamRejected {
            step: "grant admin team permission",
            error,
        };
    }

    if let Err(error) = api
        .protect_branch(
            &event.repository,
            &settings.default_branch,
            &settings.status_context,
        )
        .await
    {
        return ActionOutcome::UpstreamRejected {
            step: "apply branch protection",
            error,
        };
    }

    if let Err(error) = api.restrict_merge_strategies(&event.repository).await {
        return ActionOutcome::UpstreamRejected {
            step: "restrict merge strategies",
            error,
        };
    }

    ActionOutcome::Completed
}

async fn publish_check_outcome(
    event: &Event,
    settings: &Settings,
    api: &dyn OrgApi,
) -> ActionOutcome {
    let Some(check_suite) = event.payload.check_suite.as_ref() else {
        return ActionOutcome::PreconditionFailed {
            reason: "check_suite event carries no check suite".to_string(),
        };
    };
    let Some(sha) = check_suite.after.as_deref() else {
        return ActionOutcome::PreconditionFailed {
            reason: "check suite has no commit to report on".to_string(),
        };
    };
    let Some(conclusion) = check_suite.conclusion.as_deref() else {
        return ActionOutcome::PreconditionFailed {
            reason: "check suite has no conclusion".to_string(),
        };
    };

    match api
        .create_commit_status(
            &event.repository,
            sha,
            conclusion,
            &format!("Check Suite: {conclusion}"),
            &settings.status_context,
        )
        .await
    {
        Ok(()) => ActionOutcome::Completed,
        Err(error) => ActionOutcome::UpstreamRejected {
            step: "set commit status",
            error,
        },
    }
}

async fn align_team_name(event: &Event, settings: &Settings, api: &dyn OrgApi) -> ActionOutcome {
    let Some(team) = event.payload.team.as_ref() else {
        return ActionOutcome::PreconditionFailed {
            reason: "team event carries no team".to_string(),
        };
    };
    let Some(slug) = team.slug.as_deref() else {
        return ActionOutcome::PreconditionFailed {
            reason: "team has no slug".to_string(),
        };
    };

    // Never rename the admin team after a repository; that team belongs to
    // the course tooling, not to a student group.
    if slug == settings.admin_team_slug {
        warn!(slug, "skipping rename of the admin team");
        return ActionOutcome::Skipped {
            reason: format!("refusing to rename admin team {slug}"),
        };
    }

    match api
        .rename_team(
            slug,
            &event.repository,
            team.description.as_deref(),
            team.privacy.as_deref(),
        )
        .await
    {
        Ok(()) => ActionOutcome::Completed,
        Err(error) => ActionOutcome::UpstreamRejected {
            step: "rename team",
            error,
        },
    }
}
