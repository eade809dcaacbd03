//! Tests for the assembled webhook pipeline.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::github::UpstreamError;
use crate::memory::{MemoryPayloadStore, MemoryQueue};
use crate::registration::MemoryRegistrationStore;

const SECRET: &str = "it's a secret to everybody";

/// Upstream stub that counts calls and optionally rejects everything.
#[derive(Default)]
struct StubApi {
    calls: Mutex<Vec<&'static str>>,
    reject_with: Option<String>,
}

impl StubApi {
    fn rejecting() -> Self {
        Self::rejecting_with("nope")
    }

    fn rejecting_with(detail: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reject_with: Some(detail.to_string()),
        }
    }

    fn outcome(&self, call: &'static str) -> Result<(), UpstreamError> {
        self.calls.lock().unwrap().push(call);
        match &self.reject_with {
            Some(detail) => Err(UpstreamError {
                status: Some(403),
                detail: detail.clone(),
            }),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrgApi for StubApi {
    async fn grant_team_permission(
        &self,
        _team_slug: &str,
        _repository: &str,
        _permission: &str,
    ) -> Result<(), UpstreamError> {
        self.outcome("grant")
    }

    async fn protect_branch(
        &self,
        _repository: &str,
        _branch: &str,
        _status_context: &str,
    ) -> Result<(), UpstreamError> {
        self.outcome("protect")
    }

    async fn restrict_merge_strategies(&self, _repository: &str) -> Result<(), UpstreamError> {
        self.outcome("restrict")
    }

    async fn create_commit_status(
        &self,
        _repository: &str,
        _sha: &str,
        _state: &str,
        _description: &str,
        _context: &str,
    ) -> Result<(), UpstreamError> {
        self.outcome("status")
    }

    async fn rename_team(
        &self,
        _team_slug: &str,
        _new_name: &str,
        _description: Option<&str>,
        _privacy: Option<&str>,
    ) -> Result<(), UpstreamError> {
        self.outcome("rename")
    }
}

struct Fixture {
    pipeline: HookPipeline,
    api: Arc<StubApi>,
    store: Arc<MemoryPayloadStore>,
}

fn fixture_with(settings: Settings, api: StubApi) -> Fixture {
    let api = Arc::new(api);
    let store = Arc::new(MemoryPayloadStore::new());
    let queue = Arc::new(MemoryQueue::new(Duration::from_millis(5)));
    let registrations = Arc::new(MemoryRegistrationStore::new());
    let forwarder = Arc::new(
        Forwarder::new(
            store.clone(),
            queue,
            registrations,
            Duration::from_secs(1),
            3,
        )
        .expect("forwarder builds"),
    );
    let pipeline = HookPipeline::new(settings, api.clone(), forwarder);
    Fixture {
        pipeline,
        api,
        store,
    }
}

fn fixture() -> Fixture {
    fixture_with(Settings::for_tests(), StubApi::default())
}

fn signed(body: &str) -> String {
    signature::sign(body.as_bytes(), SECRET)
}

const REPO_CREATED: &str = r#"{
    "action": "created",
    "repository": {"name": "cmps383-2026-g01"},
    "organization": {"login": "Example-University"}
}"#;

#[tokio::test]
async fn bad_signature_is_rejected_before_any_processing() {
    let fx = fixture();

    let report = fx
        .pipeline
        .process(REPO_CREATED.as_bytes(), Some("sha256=deadbeef"))
        .await;

    assert_eq!(report.disposition(), HookDisposition::Unauthorized);
    assert_eq!(report.lines(), ["Auth failed"]);
    assert!(fx.api.calls().is_empty(), "no upstream calls");
    assert!(fx.store.is_empty(), "no payload persisted");
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let fx = fixture();
    let report = fx.pipeline.process(REPO_CREATED.as_bytes(), None).await;
    assert_eq!(report.disposition(), HookDisposition::Unauthorized);
}

#[tokio::test]
async fn repository_created_event_runs_the_setup_handler() {
    let fx = fixture();
    let header = signed(REPO_CREATED);

    let report = fx
        .pipeline
        .process(REPO_CREATED.as_bytes(), Some(&header))
        .await;

    assert_eq!(report.disposition(), HookDisposition::Handled);
    assert_eq!(fx.api.calls(), ["grant", "protect", "restrict"]);
    assert_eq!(fx.store.len(), 1, "payload staged for forwarding");
    assert!(report.body().contains("done"));
}

#[tokio::test]
async fn out_of_scope_repository_is_acknowledged_without_side_effects() {
    let fx = fixture();
    let body = r#"{
        "action": "created",
        "repository": {"name": "faculty-website"},
        "organization": {"login": "Example-University"}
    }"#;
    let header = signed(body);

    let report = fx.pipeline.process(body.as_bytes(), Some(&header)).await;

    assert_eq!(report.disposition(), HookDisposition::Handled);
    assert!(fx.api.calls().is_empty());
    assert!(fx.store.is_empty(), "out-of-scope payloads are not forwarded");
}

#[tokio::test]
async fn wrong_organization_surfaces_as_failure() {
    let fx = fixture();
    let body = r#"{
        "action": "created",
        "repository": {"name": "cmps383-2026-g01"},
        "organization": {"login": "Intruder-Org"}
    }"#;
    let header = signed(body);

    let report = fx.pipeline.process(body.as_bytes(), Some(&header)).await;

    assert_eq!(report.disposition(), HookDisposition::Failed);
    assert!(fx.api.calls().is_empty());
    assert!(fx.store.is_empty());
}

#[tokio::test]
async fn unmatched_pair_is_not_handled_but_still_forwarded() {
    let fx = fixture();
    let body = r#"{
        "action": "deleted",
        "repository": {"name": "cmps383-2026-g01"},
        "organization": {"login": "Example-University"}
    }"#;
    let header = signed(body);

    let report = fx.pipeline.process(body.as_bytes(), Some(&header)).await;

    assert_eq!(report.disposition(), HookDisposition::Handled);
    assert!(report.body().contains("event not handled"));
    assert!(fx.api.calls().is_empty());
    assert_eq!(fx.store.len(), 1, "in-scope payloads are forwarded even when unhandled");
}

#[tokio::test]
async fn check_suite_without_sha_fails_and_names_the_reason() {
    let fx = fixture();
    let body = r#"{
        "action": "completed",
        "check_suite": {"conclusion": "success"},
        "repository": {"name": "cmps383-2026-g01"},
        "organization": {"login": "Example-University"}
    }"#;
    let header = signed(body);

    let report = fx.pipeline.process(body.as_bytes(), Some(&header)).await;

    assert_eq!(report.disposition(), HookDisposition::Failed);
    assert!(report.body().contains("no commit"));
}

#[tokio::test]
async fn upstream_rejection_reports_the_failing_step() {
    let fx = fixture_with(Settings::for_tests(), StubApi::rejecting());
    let header = signed(REPO_CREATED);

    let report = fx
        .pipeline
        .process(REPO_CREATED.as_bytes(), Some(&header))
        .await;

    assert_eq!(report.disposition(), HookDisposition::Failed);
    assert!(report.body().contains("error during grant admin team permission"));
    assert!(report.body().contains("403"));
    assert_eq!(fx.api.calls(), ["grant"], "failure stops the handler");
}

#[tokio::test]
async fn upstream_json_rejection_body_is_rendered_readably() {
    let fx = fixture_with(
        Settings::for_tests(),
        StubApi::rejecting_with(r#"{"message":"Must have admin rights"}"#),
    );
    let header = signed(REPO_CREATED);

    let report = fx
        .pipeline
        .process(REPO_CREATED.as_bytes(), Some(&header))
        .await;

    assert_eq!(report.disposition(), HookDisposition::Failed);
    assert!(
        report.body().contains("\"message\": \"Must have admin rights\""),
        "response body is pretty-printed into the report"
    );
}

#[tokio::test]
async fn signed_whitespace_body_is_rejected_as_unauthorized() {
    let fx = fixture();
    let body = "  \r\n ";
    let header = signed(body);

    let report = fx.pipeline.process(body.as_bytes(), Some(&header)).await;

    assert_eq!(report.disposition(), HookDisposition::Unauthorized);
    assert!(fx.store.is_empty());
}

#[tokio::test]
async fn disabled_verification_accepts_unsigned_requests_and_says_so() {
    let mut settings = Settings::for_tests();
    settings.webhook_secret = WebhookSecret::Disabled;
    let fx = fixture_with(settings, StubApi::default());

    let report = fx.pipeline.process(REPO_CREATED.as_bytes(), None).await;

    assert_eq!(report.disposition(), HookDisposition::Handled);
    assert!(report.body().contains("signature verification disabled"));
    assert_eq!(fx.api.calls(), ["grant", "protect", "restrict"]);
}

#[tokio::test]
async fn team_rename_event_reaches_the_rename_handler() {
    let fx = fixture();
    let body = r#"{
        "team": {"slug": "g01", "name": "group 1"},
        "repository": {"name": "cmps383-2026-g01"},
        "organization": {"login": "Example-University"}
    }"#;
    let header = signed(body);

    let report = fx.pipeline.process(body.as_bytes(), Some(&header)).await;

    assert_eq!(report.disposition(), HookDisposition::Handled);
    assert_eq!(fx.api.calls(), ["rename"]);
}
