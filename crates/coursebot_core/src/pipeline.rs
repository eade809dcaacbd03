//! End-to-end processing of one inbound webhook request.
//!
//! Control flow: signature verification (reject early), classification,
//! staging of the raw payload for forwarding, then dispatch of the matched
//! handler. The outcome of every stage is accumulated into a [`HookReport`]
//! that the HTTP layer renders verbatim.

use std::sync::Arc;

use tracing::{info, warn};

use crate::dispatch::{self, ActionOutcome};
use crate::event::{self, Classification};
use crate::forwarder::Forwarder;
use crate::github::OrgApi;
use crate::report::{HookDisposition, HookReport};
use crate::settings::{Settings, WebhookSecret};
use crate::signature;

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

/// The assembled webhook pipeline.
pub struct HookPipeline {
    settings: Settings,
    api: Arc<dyn OrgApi>,
    forwarder: Arc<Forwarder>,
}

impl HookPipeline {
    pub fn new(settings: Settings, api: Arc<dyn OrgApi>, forwarder: Arc<Forwarder>) -> Self {
        Self {
            settings,
            api,
            forwarder,
        }
    }

    /// Processes one request: raw body bytes plus the value of the
    /// `X-Hub-Signature-256` header, if it was present.
    pub async fn process(&self, body: &[u8], signature_header: Option<&str>) -> HookReport {
        let mut report = HookReport::new();

        match &self.settings.webhook_secret {
            WebhookSecret::Shared(secret) => {
                if !signature::verify(body, secret, signature_header) {
                    info!("rejecting webhook delivery with bad or missing signature");
                    report.note("Auth failed");
                    return report.resolve(HookDisposition::Unauthorized);
                }
            }
            WebhookSecret::Disabled => {
                warn!("accepting webhook delivery WITHOUT signature verification");
                report.note("signature verification disabled by configuration");
            }
        }

        let event = match event::classify(body, &self.settings) {
            Ok(Classification::Routed(event)) => event,
            Ok(Classification::Skipped(reason)) => {
                info!(%reason, "webhook delivery skipped");
                report.note(reason.to_string());
                return report.resolve(HookDisposition::Handled);
            }
            Err(error) => {
                warn!(%error, "webhook delivery failed classification");
                report.note(error.to_string());
                return report.resolve(HookDisposition::Failed);
            }
        };

        // Stage the raw payload for forwarding before dispatch; delivery to
        // the registered destination happens asynchronously.
        let name = self.forwarder.stage(&event.repository, body).await;
        report.note(format!("stored payload for forwarding as {name}"));

        let Some(action) = dispatch::route(&event) else {
            report.note(format!(
                "event not handled: {} {}",
                event.action.as_deref().unwrap_or("<no action>"),
                event.target_type,
            ));
            return report.resolve(HookDisposition::Handled);
        };

        report.note(format!(
            "performing {action} for: {} {}",
            event.action.as_deref().unwrap_or("<no action>"),
            event.target_type,
        ));

        match dispatch::execute(action, &event, &self.settings, self.api.as_ref()).await {
            ActionOutcome::Completed => {
                report.note("done");
                report.resolve(HookDisposition::Handled)
            }
            ActionOutcome::Skipped { reason } => {
                report.note(reason);
                report.resolve(HookDisposition::Handled)
            }
            ActionOutcome::PreconditionFailed { reason } => {
                report.note(reason);
                report.resolve(HookDisposition::Failed)
            }
            ActionOutcome::UpstreamRejected { step, error } => {
                report.note(format!("error during {step}"));
                report.note(error.to_string());
                // GitHub rejections carry a JSON body; render it readably.
                if let Ok(body) = serde_json::from_str::<serde_json::Value>(&error.detail) {
                    report.note_json(&body);
                }
                report.resolve(HookDisposition::Failed)
            }
        }
    }
}
