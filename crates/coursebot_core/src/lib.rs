//! Core webhook intake and durable forwarding pipeline for CourseBot.
//!
//! This crate contains everything between the raw HTTP request and the
//! upstream GitHub API:
//!
//! - [`signature`] verifies the `X-Hub-Signature-256` header against the
//!   shared webhook secret.
//! - [`event`] classifies a raw JSON body into a typed [`event::Event`].
//! - [`dispatch`] routes a classified event to the matching handler and runs
//!   it against the [`github::OrgApi`] seam.
//! - [`forwarder`] persists the raw payload and re-delivers it to the URL
//!   registered for the originating repository, with bounded retries and
//!   at-least-once semantics.
//! - [`registration`] is the per-repository destination URL store.
//! - [`pipeline`] ties the pieces together and produces a [`report::HookReport`]
//!   describing what happened for the HTTP response body.
//!
//! The HTTP host lives in the `coursebot_api` crate; the GitHub REST adapter
//! implementing [`github::OrgApi`] lives in the `github_client` crate.

pub mod dispatch;
pub mod event;
pub mod forwarder;
pub mod github;
pub mod memory;
pub mod pipeline;
pub mod registration;
pub mod report;
pub mod settings;
pub mod signature;

pub use dispatch::{ActionOutcome, HookAction};
pub use event::{Classification, ClassifyError, Event, EventPayload, SkipReason};
pub use forwarder::{DeliveryOutcome, DeliveryQueue, DeliveryTask, Forwarder, PayloadStore};
pub use github::{OrgApi, UpstreamError};
pub use memory::{MemoryPayloadStore, MemoryQueue};
pub use pipeline::HookPipeline;
pub use registration::{MemoryRegistrationStore, RegistrationStore};
pub use report::{HookDisposition, HookReport};
pub use settings::{Settings, SettingsError, WebhookSecret};
