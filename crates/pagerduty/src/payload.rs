use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::severity::Severity;
use crate::snapshot::{ErrorGroup, EventMetadata, EventSnapshot, NotifyRule};

/// Summaries combine a title with the culprit; the title part is capped so
/// the incident list stays scannable.
const SUMMARY_TITLE_LIMIT: usize = 40;

const LOGO_ASSET_PATH: &str = "_static/sentry/images/sentry-email-avatar.png";
const CLIENT_NAME: &str = "Sentry";

/// Resolves host tag keys and values to their display form.
pub trait TagLabelResolver: Send + Sync {
    /// Canonical key as the allow-list names it.
    fn standardize_key(&self, key: &str) -> String;
    /// Human-readable label for a tag value.
    fn value_label(&self, key: &str, value: &str) -> String;
}

/// Default resolver: strips the host-internal `sentry:` key prefix and
/// passes values through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardTagResolver;

impl TagLabelResolver for StandardTagResolver {
    fn standardize_key(&self, key: &str) -> String {
        key.strip_prefix("sentry:").unwrap_or(key).to_string()
    }

    fn value_label(&self, _key: &str, value: &str) -> String {
        value.to_string()
    }
}

/// Events API v2 request body for the `trigger` action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TriggerPayload {
    pub payload: AlertBody,
    pub images: Vec<ImageRef>,
    pub dedup_key: String,
    pub event_action: &'static str,
    pub client: &'static str,
    pub client_url: String,
    pub routing_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AlertBody {
    pub summary: String,
    pub timestamp: String,
    pub source: String,
    pub severity: Severity,
    pub component: Option<String>,
    pub group: String,
    pub class: String,
    pub custom_details: CustomDetails,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub src: String,
    pub href: String,
    pub alt: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomDetails {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Assignee")]
    pub assignee: String,
    #[serde(rename = "Sentry ID")]
    pub sentry_id: String,
    #[serde(rename = "Sentry Group")]
    pub sentry_group: String,
    #[serde(rename = "Checksum")]
    pub checksum: Option<String>,
    #[serde(rename = "Project ID")]
    pub project_id: String,
    #[serde(rename = "Project Name")]
    pub project_name: String,
    #[serde(rename = "Logger")]
    pub logger: Option<String>,
    #[serde(rename = "Triggering Rules")]
    pub triggering_rules: String,
    #[serde(rename = "Tags")]
    pub tags: Vec<String>,
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "Number of times seen")]
    pub times_seen: u64,
    #[serde(rename = "First seen")]
    pub first_seen: String,
    #[serde(rename = "Number of users seen")]
    pub users_seen: u64,
}

/// Inputs for one payload build: the group, the concrete event when the host
/// supplies one, the rules that matched, and the installation base URL.
#[derive(Clone, Copy, Debug)]
pub struct PayloadContext<'a> {
    pub group: &'a ErrorGroup,
    pub event: Option<&'a EventSnapshot>,
    pub rules: &'a [NotifyRule],
    pub url_prefix: &'a str,
}

/// Repeated notifications for one group must collapse into one incident, so
/// the key is a pure function of project slug and group id.
pub fn dedup_key(project_slug: &str, group_id: u64) -> String {
    format!("sentry-{project_slug}-{group_id}")
}

pub fn build_trigger_payload(
    context: &PayloadContext<'_>,
    routing_key: &SecretString,
    severity: Severity,
    tag_filter: &BTreeSet<String>,
    resolver: &dyn TagLabelResolver,
) -> TriggerPayload {
    let group = context.group;
    let description = build_description(group, context.event).unwrap_or_default();
    let assignee = group
        .assignee
        .as_ref()
        .map(|actor| actor.display_name())
        .unwrap_or_else(|| "Not assigned to anyone yet".to_string());

    let mut timestamp = group.last_seen;
    if let Some(event) = context.event {
        timestamp = timestamp.max(event.datetime);
    }

    let url_prefix = context.url_prefix.trim_end_matches('/');

    TriggerPayload {
        payload: AlertBody {
            summary: build_summary(group),
            timestamp: format_timestamp(timestamp),
            source: group.project.name.clone(),
            severity,
            component: group.culprit.clone(),
            group: group.project.slug.clone(),
            class: group.title.clone(),
            custom_details: CustomDetails {
                description,
                assignee,
                sentry_id: group.id.to_string(),
                sentry_group: group.message.clone(),
                checksum: group.checksum.clone(),
                project_id: group.project.slug.clone(),
                project_name: group.project.name.clone(),
                logger: group.logger.clone(),
                triggering_rules: rule_footer(group, context.rules),
                tags: filtered_tags(context.event, tag_filter, resolver),
                status: group.status.verbose_label(),
                times_seen: group.times_seen,
                first_seen: format_timestamp(group.first_seen),
                users_seen: group.users_seen,
            },
        },
        images: vec![ImageRef {
            src: format!("{url_prefix}/{LOGO_ASSET_PATH}"),
            href: url_prefix.to_string(),
            alt: group.title.clone(),
        }],
        dedup_key: dedup_key(&group.project.slug, group.id),
        event_action: "trigger",
        client: CLIENT_NAME,
        client_url: client_url(&group.permalink),
        routing_key: routing_key.expose_secret().to_string(),
    }
}

/// Incident summary. Error groups lead with the exception type, CSP reports
/// with the violated directive; anything else falls back to the group title.
pub fn build_summary(group: &ErrorGroup) -> String {
    match &group.metadata {
        EventMetadata::Error { kind: Some(kind), .. } => match &group.culprit {
            Some(culprit) => format!("{} - {culprit}", truncate_chars(kind, SUMMARY_TITLE_LIMIT)),
            None => kind.clone(),
        },
        EventMetadata::Error { kind: None, .. } => match &group.culprit {
            Some(culprit) => format!("{} - {culprit}", group.title),
            None => group.title.clone(),
        },
        EventMetadata::Csp { directive, uri } => format!("{directive} - {uri}"),
        EventMetadata::Other => match &group.culprit {
            Some(culprit) => {
                format!("{} - {culprit}", truncate_chars(&group.title, SUMMARY_TITLE_LIMIT))
            }
            None => group.title.clone(),
        },
    }
}

/// Secondary description line: the exception value, or the function name
/// when there is no value. Only error events carry one.
pub fn build_description(group: &ErrorGroup, event: Option<&EventSnapshot>) -> Option<String> {
    let metadata = event.and_then(|event| event.metadata.as_ref()).unwrap_or(&group.metadata);
    match metadata {
        EventMetadata::Error { value, function, .. } => {
            value.clone().or_else(|| function.clone())
        }
        EventMetadata::Csp { .. } | EventMetadata::Other => None,
    }
}

fn rule_footer(group: &ErrorGroup, rules: &[NotifyRule]) -> String {
    let mut footer = group.qualified_short_id.clone();

    if let Some((first, rest)) = rules.split_first() {
        footer.push_str(&format!(" via {}", first.label));
        if !rest.is_empty() {
            footer.push_str(&format!(" (+{} other)", rest.len()));
        }
    }

    footer
}

fn filtered_tags(
    event: Option<&EventSnapshot>,
    tag_filter: &BTreeSet<String>,
    resolver: &dyn TagLabelResolver,
) -> Vec<String> {
    let Some(event) = event else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    for (key, value) in &event.tags {
        let standardized = resolver.standardize_key(key);
        if !tag_filter.contains(&standardized) {
            continue;
        }
        fields.push(format!("{standardized}:{}", resolver.value_label(key, value)));
    }

    fields
}

fn client_url(permalink: &str) -> String {
    let separator = if permalink.contains('?') { '&' } else { '?' };
    format!("{permalink}{separator}referrer=pagerduty")
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}
