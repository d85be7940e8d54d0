use serde::{Deserialize, Serialize};

/// Severity accepted by the Events API v2 `payload.severity` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Maps a host event level to a severity. The table is total over the
    /// host's level vocabulary; anything else is a configuration problem the
    /// caller must flag.
    pub fn from_level(level: &str) -> Option<Self> {
        match level.trim().to_ascii_lowercase().as_str() {
            "debug" | "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of an error group as tracked by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupStatus {
    Unresolved,
    Resolved,
    Ignored,
    PendingDeletion,
    DeletionInProgress,
    PendingMerge,
}

impl GroupStatus {
    pub fn verbose_label(&self) -> &'static str {
        match self {
            Self::Unresolved => "UNRESOLVED",
            Self::Resolved => "RESOLVED",
            Self::Ignored => "IGNORED",
            Self::PendingDeletion => "PENDING_DELETION",
            Self::DeletionInProgress => "DELETION_IN_PROGRESS",
            Self::PendingMerge => "PENDING_MERGE",
        }
    }

    /// Ignored groups are muted by an operator; notifications are skipped.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}
