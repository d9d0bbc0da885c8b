//! Types for the investigation workflow

use chrono::{DateTime, Utc};
use sentinel_core::{Finding, LoadingPhase};
use serde::{Deserialize, Serialize};

/// Severity of a transient user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    Success,
    Error,
}

/// Transient message for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: NotificationSeverity,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            severity: NotificationSeverity::Success,
            title: title.into(),
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            severity: NotificationSeverity::Error,
            title: "Error".to_string(),
            description: description.into(),
            timestamp: Utc::now(),
        }
    }

    /// Notification after a new investigation was installed
    pub fn investigation_started(subject: &str, query_count: usize) -> Self {
        Self::success(
            "Investigation Started",
            format!(
                "Generated {} initial queries for \"{}\".",
                query_count, subject
            ),
        )
    }

    /// Notification after suggestions were merged into the query list
    pub fn queries_added(added: usize) -> Self {
        Self::success(
            "New Queries Added",
            format!("Discovered {} new avenues of investigation.", added),
        )
    }

    pub fn profile_summarized() -> Self {
        Self::success("Profile Summarized", "AI has generated a profile summary.")
    }

    pub fn is_error(&self) -> bool {
        self.severity == NotificationSeverity::Error
    }
}

/// Read-only copy of the session for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestigationSnapshot {
    pub subject: Option<String>,
    pub queries: Vec<String>,
    /// Completed queries, in query order
    pub completed_queries: Vec<String>,
    /// Queries with a search in flight, in query order
    pub pending_queries: Vec<String>,
    /// Newest first
    pub findings: Vec<Finding>,
    pub summary: Option<String>,
    pub loading_phase: LoadingPhase,
    pub generation: u64,
    pub can_request_suggestions: bool,
    pub can_request_summary: bool,
}

impl InvestigationSnapshot {
    pub fn is_active(&self) -> bool {
        self.subject.is_some()
    }

    pub fn is_completed(&self, query: &str) -> bool {
        self.completed_queries.iter().any(|q| q == query)
    }
}

/// Events published after every state change
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvestigationEvent {
    Notification(Notification),
    StateChanged(InvestigationSnapshot),
}

/// Result of a successful `start_investigation`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartOutcome {
    pub subject: String,
    pub queries: Vec<String>,
    pub generation: u64,
}

/// Result of a `run_search` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// The finding was recorded
    Completed { finding: Finding },
    /// The query had already been searched; nothing changed
    AlreadyCompleted,
    /// A search for this query is still in flight; nothing changed
    AlreadyPending,
    /// The investigation changed while the search was running; the finding was dropped
    Discarded,
}

impl SearchOutcome {
    pub fn finding(&self) -> Option<&Finding> {
        match self {
            SearchOutcome::Completed { finding } => Some(finding),
            _ => None,
        }
    }
}

/// Result of a successful `request_suggestions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionOutcome {
    /// Terms appended to the query list, in returned order
    pub added: Vec<String>,
    /// Terms dropped because they were already queries
    pub skipped: usize,
}
