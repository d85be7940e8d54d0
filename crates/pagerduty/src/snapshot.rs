use chrono::{DateTime, Utc};

use crate::actor::Actor;
use crate::severity::GroupStatus;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectRef {
    pub slug: String,
    pub name: String,
}

/// Event metadata keyed by the kind of event the group aggregates. Titles
/// and descriptions are built differently per kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventMetadata {
    Error { kind: Option<String>, value: Option<String>, function: Option<String> },
    Csp { directive: String, uri: String },
    Other,
}

/// Snapshot of an error group at the moment a rule fired. Derived from host
/// state; never written back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorGroup {
    pub id: u64,
    pub title: String,
    pub culprit: Option<String>,
    pub message: String,
    pub checksum: Option<String>,
    pub logger: Option<String>,
    pub qualified_short_id: String,
    pub status: GroupStatus,
    pub times_seen: u64,
    pub users_seen: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// Absolute deep link to the group in the host UI.
    pub permalink: String,
    pub assignee: Option<Actor>,
    pub metadata: EventMetadata,
    pub project: ProjectRef,
}

/// The concrete event that matched the rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventSnapshot {
    pub tags: Vec<(String, String)>,
    pub datetime: DateTime<Utc>,
    /// Event-level metadata when it differs from the group's.
    pub metadata: Option<EventMetadata>,
}

impl EventSnapshot {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.iter().find(|(tag_key, _)| tag_key == key).map(|(_, value)| value.as_str())
    }

    pub fn level(&self) -> Option<&str> {
        self.tag("level")
    }
}

/// A rule that matched, referenced by label in the alert footer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotifyRule {
    pub label: String,
}
