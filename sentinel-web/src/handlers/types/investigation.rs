//! Investigation-related types

use sentinel_applications::{InvestigationSnapshot, SearchOutcome, StartOutcome, SuggestionOutcome};
use sentinel_core::Finding;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Start investigation request
#[derive(Deserialize, Serialize, ToSchema)]
pub struct StartInvestigationRequest {
    #[schema(example = "John Doe")]
    pub subject: String,
}

/// Start investigation response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct StartInvestigationResponse {
    #[schema(example = "John Doe")]
    pub subject: String,
    #[schema(example = json!(["John Doe LinkedIn", "John Doe address"]))]
    pub queries: Vec<String>,
    #[schema(example = 1)]
    pub generation: u64,
}

impl From<StartOutcome> for StartInvestigationResponse {
    fn from(outcome: StartOutcome) -> Self {
        Self {
            subject: outcome.subject,
            queries: outcome.queries,
            generation: outcome.generation,
        }
    }
}

/// Search request
#[derive(Deserialize, Serialize, ToSchema)]
pub struct SearchRequest {
    #[schema(example = "John Doe LinkedIn")]
    pub query: String,
    /// Wait for the finding instead of returning once the search started
    #[schema(example = true)]
    pub wait: Option<bool>,
}

/// Search response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    /// One of `completed`, `started`, `already_completed`, `already_pending`, `discarded`
    #[schema(example = "completed")]
    pub status: String,
    pub finding: Option<FindingView>,
}

impl SearchResponse {
    pub fn started() -> Self {
        Self {
            status: "started".to_string(),
            finding: None,
        }
    }
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        let (status, finding) = match outcome {
            SearchOutcome::Completed { finding } => ("completed", Some(finding.into())),
            SearchOutcome::AlreadyCompleted => ("already_completed", None),
            SearchOutcome::AlreadyPending => ("already_pending", None),
            SearchOutcome::Discarded => ("discarded", None),
        };
        Self {
            status: status.to_string(),
            finding,
        }
    }
}

/// Suggestions response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SuggestionsResponse {
    /// Queries appended to the investigation
    #[schema(example = json!(["John Doe phone"]))]
    pub added: Vec<String>,
    /// Suggested terms that were already queries
    #[schema(example = 1)]
    pub skipped: usize,
}

impl From<SuggestionOutcome> for SuggestionsResponse {
    fn from(outcome: SuggestionOutcome) -> Self {
        Self {
            added: outcome.added,
            skipped: outcome.skipped,
        }
    }
}

/// Summary response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    #[schema(example = "John Doe works at Acme Corporation.")]
    pub summary: String,
}

/// A finding as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FindingView {
    #[schema(example = "finding-6f1c2d0e-6a0b-4d39-9f0e-0c7c3b1a2b3c")]
    pub id: String,
    /// person, place, organization, document, social or other
    #[serde(rename = "type")]
    #[schema(example = "social")]
    pub finding_type: String,
    #[schema(example = "LinkedIn profile found")]
    pub title: String,
    #[schema(example = "Based on the query: \"John Doe LinkedIn\"")]
    pub content: String,
    #[schema(example = "John Doe LinkedIn")]
    pub source_query: String,
    pub discovered_at: chrono::DateTime<chrono::Utc>,
}

impl From<Finding> for FindingView {
    fn from(finding: Finding) -> Self {
        Self {
            id: finding.id,
            finding_type: finding.finding_type.to_string(),
            title: finding.title,
            content: finding.content,
            source_query: finding.source_query,
            discovered_at: finding.discovered_at,
        }
    }
}

/// Full investigation state
#[derive(Serialize, Deserialize, ToSchema)]
pub struct InvestigationResponse {
    /// Absent while no investigation is active
    #[schema(example = "John Doe")]
    pub subject: Option<String>,
    pub is_active: bool,
    pub queries: Vec<String>,
    pub completed_queries: Vec<String>,
    pub pending_queries: Vec<String>,
    /// Newest first
    pub findings: Vec<FindingView>,
    pub summary: Option<String>,
    /// idle, loading-queries, searching, loading-suggestions or summarizing
    #[schema(example = "idle")]
    pub loading_phase: String,
    pub generation: u64,
    pub can_request_suggestions: bool,
    pub can_request_summary: bool,
}

impl From<InvestigationSnapshot> for InvestigationResponse {
    fn from(snapshot: InvestigationSnapshot) -> Self {
        Self {
            is_active: snapshot.is_active(),
            subject: snapshot.subject,
            queries: snapshot.queries,
            completed_queries: snapshot.completed_queries,
            pending_queries: snapshot.pending_queries,
            findings: snapshot.findings.into_iter().map(FindingView::from).collect(),
            summary: snapshot.summary,
            loading_phase: snapshot.loading_phase.to_string(),
            generation: snapshot.generation,
            can_request_suggestions: snapshot.can_request_suggestions,
            can_request_summary: snapshot.can_request_summary,
        }
    }
}
