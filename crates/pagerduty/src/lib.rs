//! PagerDuty notify action for error-tracking rules.
//!
//! When an alerting rule matches an error group, the host schedules one
//! deferred work unit per distinct PagerDuty integration (keyed
//! `pagerduty:{integration_id}`) and invokes [`NotifyAction::notify`] with a
//! snapshot of the group and triggering event. The action resolves the stored
//! integration credential, builds an Events API v2 "trigger" payload, and
//! submits it.
//!
//! Delivery failures never propagate: a removed integration silently
//! deactivates the rule, and upstream API errors are logged and swallowed so
//! other rule actions keep evaluating.
//!
//! # Key Types
//!
//! - `NotifyAction` - the per-rule work unit
//! - `IntegrationStore` - lookup seam for stored integration credentials
//! - `AlertTransport` / `EventsClient` - Events API v2 delivery
//! - `build_trigger_payload` - pure payload construction

pub mod action;
pub mod actor;
pub mod client;
pub mod payload;
pub mod severity;
pub mod snapshot;

pub use action::{
    Integration, IntegrationStore, IntegrationStoreError, NotifyAction, NotifyOutcome,
    RuleSettings,
};
pub use actor::Actor;
pub use client::{AlertTransport, EventsApiError, EventsApiResponse, EventsClient};
pub use payload::{
    build_trigger_payload, dedup_key, PayloadContext, StandardTagResolver, TagLabelResolver,
    TriggerPayload,
};
pub use severity::{GroupStatus, Severity};
pub use snapshot::{ErrorGroup, EventMetadata, EventSnapshot, NotifyRule, ProjectRef};
