use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, error, warn};

use alertlink_core::config::PagerdutyConfig;

use crate::client::AlertTransport;
use crate::payload::{build_trigger_payload, PayloadContext, StandardTagResolver, TagLabelResolver};
use crate::severity::Severity;
use crate::snapshot::{ErrorGroup, EventSnapshot, NotifyRule};

/// Stored PagerDuty account connection. Looked up per notification, never
/// mutated here.
#[derive(Clone, Debug)]
pub struct Integration {
    pub id: u64,
    pub name: String,
    pub organization_id: u64,
    pub routing_key: SecretString,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntegrationStoreError {
    #[error("integration lookup failed: {0}")]
    Lookup(String),
}

/// Lookup seam for integration credentials held by the host.
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    async fn find(
        &self,
        organization_id: u64,
        integration_id: u64,
    ) -> Result<Option<Integration>, IntegrationStoreError>;
}

/// Rule configuration: which integration to page, an optional severity
/// override, and the tag keys surfaced in the alert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSettings {
    pub integration_id: u64,
    pub severity: Option<Severity>,
    pub tags: BTreeSet<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyOutcome {
    Delivered,
    GroupIgnored,
    IntegrationMissing,
    LookupFailed,
    RejectedByApi,
    DeliveryFailed,
}

/// The per-rule notification work unit. The host's task queue runs one of
/// these per matching rule, deduplicated by [`NotifyAction::work_key`].
pub struct NotifyAction<S> {
    store: S,
    transport: Arc<dyn AlertTransport>,
    resolver: Arc<dyn TagLabelResolver>,
    settings: RuleSettings,
    organization_id: u64,
    url_prefix: String,
}

impl<S> NotifyAction<S>
where
    S: IntegrationStore,
{
    pub fn new(
        store: S,
        transport: Arc<dyn AlertTransport>,
        settings: RuleSettings,
        organization_id: u64,
        config: &PagerdutyConfig,
    ) -> Self {
        Self {
            store,
            transport,
            resolver: Arc::new(StandardTagResolver),
            settings,
            organization_id,
            url_prefix: config.url_prefix.clone(),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn TagLabelResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Deduplication key for the host task queue: one deferred work unit per
    /// integration, whatever the host decides to batch under it.
    pub fn work_key(&self) -> String {
        format!("pagerduty:{}", self.settings.integration_id)
    }

    /// Builds and submits one alert. Every failure mode is absorbed here so
    /// rule evaluation for other actions is never disrupted.
    pub async fn notify(
        &self,
        group: &ErrorGroup,
        event: Option<&EventSnapshot>,
        matched_rules: &[NotifyRule],
    ) -> NotifyOutcome {
        if group.status.is_ignored() {
            debug!(
                event_name = "rule.skip.pagerduty_group_ignored",
                group_id = group.id,
                "group is ignored; skipping notification"
            );
            return NotifyOutcome::GroupIgnored;
        }

        let integration =
            match self.store.find(self.organization_id, self.settings.integration_id).await {
                Ok(Some(integration)) => integration,
                Ok(None) => {
                    // Integration removed; the rule stays configured but inert.
                    debug!(
                        event_name = "rule.skip.pagerduty_integration_missing",
                        integration_id = self.settings.integration_id,
                        "integration no longer exists; skipping notification"
                    );
                    return NotifyOutcome::IntegrationMissing;
                }
                Err(lookup_error) => {
                    error!(
                        event_name = "rule.fail.pagerduty_lookup",
                        error_message = %lookup_error,
                        integration_id = self.settings.integration_id,
                        "integration lookup failed; skipping notification"
                    );
                    return NotifyOutcome::LookupFailed;
                }
            };

        let severity = self.resolve_severity(event);
        let context = PayloadContext {
            group,
            event,
            rules: matched_rules,
            url_prefix: &self.url_prefix,
        };
        let payload = build_trigger_payload(
            &context,
            &integration.routing_key,
            severity,
            &self.settings.tags,
            self.resolver.as_ref(),
        );

        // Counts attempts, not confirmed deliveries.
        counter!("alert.sent", "instance" => "pagerduty.alert").increment(1);

        match self.transport.send_trigger(&payload).await {
            Ok(response) if response.is_success() => NotifyOutcome::Delivered,
            Ok(response) => {
                error!(
                    event_name = "rule.fail.pagerduty_post",
                    api_status = %response.status,
                    api_message = response.message.as_deref().unwrap_or(""),
                    api_errors = ?response.errors,
                    "events api did not accept the alert"
                );
                NotifyOutcome::RejectedByApi
            }
            Err(send_error) => {
                error!(
                    event_name = "rule.fail.pagerduty_post",
                    error_message = %send_error,
                    error_class = send_error.class(),
                    "events api call failed"
                );
                NotifyOutcome::DeliveryFailed
            }
        }
    }

    fn resolve_severity(&self, event: Option<&EventSnapshot>) -> Severity {
        if let Some(severity) = self.settings.severity {
            return severity;
        }

        let level = event.and_then(EventSnapshot::level);
        match level.and_then(Severity::from_level) {
            Some(severity) => severity,
            None => {
                warn!(
                    event_name = "rule.flag.pagerduty_severity",
                    level = level.unwrap_or("missing"),
                    "event level has no severity mapping and the rule has no override; defaulting to error"
                );
                Severity::Error
            }
        }
    }
}
