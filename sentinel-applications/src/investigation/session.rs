//! In-memory investigation state and its transitions
//!
//! Every method here is synchronous and mutates the session in one step. The
//! manager wraps the session in a lock and calls exactly one transition per
//! critical section, so each completion is applied atomically.

use super::types::{InvestigationSnapshot, SearchOutcome};
use sentinel_core::{Finding, InvestigationConfig, LoadingPhase};
use std::collections::HashSet;

/// Why a search was not started
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRejection {
    /// The query is not part of the current investigation
    UnknownQuery,
    /// The query was already searched
    AlreadyCompleted,
    /// A search for this query is in flight
    AlreadyPending,
}

impl SearchRejection {
    /// Outcome reported for a rejection that leaves the session untouched
    pub fn as_outcome(&self) -> Option<SearchOutcome> {
        match self {
            SearchRejection::UnknownQuery => None,
            SearchRejection::AlreadyCompleted => Some(SearchOutcome::AlreadyCompleted),
            SearchRejection::AlreadyPending => Some(SearchOutcome::AlreadyPending),
        }
    }
}

/// Claim on an in-flight search, redeemed by [`InvestigationSession::complete_search`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    query: String,
    generation: u64,
}

impl SearchTicket {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// State of the current investigation
#[derive(Debug, Clone, Default)]
pub struct InvestigationSession {
    subject: Option<String>,
    queries: Vec<String>,
    completed: HashSet<String>,
    pending: HashSet<String>,
    findings: Vec<Finding>,
    summary: Option<String>,
    phase: LoadingPhase,
    /// Bumped every time a new investigation replaces the old one
    generation: u64,
}

impl InvestigationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn phase(&self) -> LoadingPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.subject.is_some()
    }

    pub fn has_query(&self, query: &str) -> bool {
        self.queries.iter().any(|q| q == query)
    }

    pub fn is_completed(&self, query: &str) -> bool {
        self.completed.contains(query)
    }

    /// Queries that have neither completed nor are in flight, in query order
    pub fn unsearched_queries(&self) -> Vec<String> {
        self.queries
            .iter()
            .filter(|q| !self.completed.contains(*q) && !self.pending.contains(*q))
            .cloned()
            .collect()
    }

    /// Enter an operation's loading phase
    pub fn begin(&mut self, phase: LoadingPhase) {
        self.phase = phase;
    }

    /// Leave `phase`, unless another operation has taken over meanwhile
    pub fn finish(&mut self, phase: LoadingPhase) {
        if self.phase == phase {
            self.phase = self.resting_phase();
        }
    }

    fn resting_phase(&self) -> LoadingPhase {
        if self.pending.is_empty() {
            LoadingPhase::Idle
        } else {
            LoadingPhase::Searching
        }
    }

    /// Replace the current investigation with a fresh one
    pub fn install_investigation(&mut self, subject: String, queries: Vec<String>) -> u64 {
        let mut installed: Vec<String> = Vec::with_capacity(queries.len());
        for query in queries {
            if !installed.contains(&query) {
                installed.push(query);
            }
        }

        self.generation += 1;
        self.subject = Some(subject);
        self.queries = installed;
        self.completed.clear();
        self.pending.clear();
        self.findings.clear();
        self.summary = None;
        self.phase = LoadingPhase::Idle;
        self.generation
    }

    /// Mark `query` as in flight
    pub fn begin_search(&mut self, query: &str) -> Result<SearchTicket, SearchRejection> {
        if !self.has_query(query) {
            return Err(SearchRejection::UnknownQuery);
        }
        if self.completed.contains(query) {
            return Err(SearchRejection::AlreadyCompleted);
        }
        if !self.pending.insert(query.to_string()) {
            return Err(SearchRejection::AlreadyPending);
        }

        // An enrichment call in flight keeps its phase; `finish` rests on Searching
        if self.phase.is_idle() {
            self.phase = LoadingPhase::Searching;
        }
        Ok(SearchTicket {
            query: query.to_string(),
            generation: self.generation,
        })
    }

    /// Record the finding of a search started with `ticket`.
    ///
    /// Returns `false` and leaves the session untouched when the ticket belongs
    /// to a replaced investigation or its query is no longer known.
    pub fn complete_search(&mut self, ticket: &SearchTicket, finding: Finding) -> bool {
        if ticket.generation != self.generation || !self.has_query(&ticket.query) {
            return false;
        }

        self.pending.remove(&ticket.query);
        self.completed.insert(ticket.query.clone());
        self.findings.insert(0, finding);

        if self.phase == LoadingPhase::Searching && self.pending.is_empty() {
            self.phase = LoadingPhase::Idle;
        }
        true
    }

    /// Append suggested terms that are not queries yet.
    ///
    /// Returns the appended terms, in the order given.
    pub fn append_queries(&mut self, terms: Vec<String>) -> Vec<String> {
        let mut added = Vec::new();
        for term in terms {
            if !self.has_query(&term) {
                self.queries.push(term.clone());
                added.push(term);
            }
        }
        added
    }

    pub fn set_summary(&mut self, summary: String) {
        self.summary = Some(summary);
    }

    /// Findings as `title: content` lines, newest first
    pub fn findings_blob(&self) -> String {
        self.findings
            .iter()
            .map(Finding::as_data_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn snapshot(&self, config: &InvestigationConfig) -> InvestigationSnapshot {
        let in_query_order = |set: &HashSet<String>| {
            self.queries
                .iter()
                .filter(|q| set.contains(*q))
                .cloned()
                .collect::<Vec<_>>()
        };

        InvestigationSnapshot {
            subject: self.subject.clone(),
            queries: self.queries.clone(),
            completed_queries: in_query_order(&self.completed),
            pending_queries: in_query_order(&self.pending),
            findings: self.findings.clone(),
            summary: self.summary.clone(),
            loading_phase: self.phase,
            generation: self.generation,
            can_request_suggestions: self.findings.len() >= config.min_findings_for_suggestions,
            can_request_summary: self.findings.len() >= config.min_findings_for_summary,
        }
    }
}
