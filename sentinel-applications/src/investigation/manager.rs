//! Investigation Manager - drives the investigation session
//!
//! All state lives in one [`InvestigationSession`] behind an async lock. Each
//! operation takes the lock only to apply a single transition; gateway and
//! search calls run with the lock released, so any number of operations can
//! be in flight and their completions may land in any order.

use super::session::{InvestigationSession, SearchTicket};
use super::types::{
    InvestigationEvent, InvestigationSnapshot, Notification, SearchOutcome, StartOutcome,
    SuggestionOutcome,
};
use crate::{ApplicationError, ApplicationResult};
use sentinel_core::{
    log_operation_start, log_operation_success, EnrichmentGateway, GatewayError,
    InvestigationConfig, LoadingPhase, SearchBackend,
};
use sentinel_gateway::messages;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What happened when a detached search was requested
#[derive(Debug)]
pub enum SearchDispatch {
    /// The search is running; the handle resolves to its outcome
    Started(JoinHandle<SearchOutcome>),
    /// Nothing was started
    Skipped(SearchOutcome),
}

/// Shared handle to the investigation session
#[derive(Clone)]
pub struct InvestigationManager {
    session: Arc<RwLock<InvestigationSession>>,
    gateway: Arc<dyn EnrichmentGateway>,
    search_backend: Arc<dyn SearchBackend>,
    config: InvestigationConfig,
    events: broadcast::Sender<InvestigationEvent>,
}

impl InvestigationManager {
    pub fn new(
        gateway: Arc<dyn EnrichmentGateway>,
        search_backend: Arc<dyn SearchBackend>,
        config: InvestigationConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));

        Self {
            session: Arc::new(RwLock::new(InvestigationSession::new())),
            gateway,
            search_backend,
            config,
            events,
        }
    }

    pub fn config(&self) -> &InvestigationConfig {
        &self.config
    }

    /// Subscribe to notifications and state changes
    pub fn subscribe(&self) -> broadcast::Receiver<InvestigationEvent> {
        self.events.subscribe()
    }

    /// Current state of the investigation
    pub async fn snapshot(&self) -> InvestigationSnapshot {
        self.session.read().await.snapshot(&self.config)
    }

    /// Check a subject against the configured length bounds (in characters)
    pub fn validate_subject(&self, subject: &str) -> ApplicationResult<()> {
        let length = subject.chars().count();

        if length < self.config.subject_min_len {
            return Err(ApplicationError::validation(
                "subject",
                format!(
                    "Subject must be at least {} characters.",
                    self.config.subject_min_len
                ),
            ));
        }
        if length > self.config.subject_max_len {
            return Err(ApplicationError::validation(
                "subject",
                format!(
                    "Subject must be {} characters or less.",
                    self.config.subject_max_len
                ),
            ));
        }
        Ok(())
    }

    /// Generate initial queries for `subject` and replace the current investigation
    pub async fn start_investigation(&self, subject: &str) -> ApplicationResult<StartOutcome> {
        self.validate_subject(subject)?;
        log_operation_start!("start_investigation", subject = %subject);

        self.transition(|session| session.begin(LoadingPhase::LoadingQueries))
            .await;

        match self.gateway.generate_queries(subject).await {
            Ok(queries) => {
                let (generation, queries) = self
                    .transition(|session| {
                        let generation =
                            session.install_investigation(subject.to_string(), queries);
                        (generation, session.queries().to_vec())
                    })
                    .await;

                self.notify(Notification::investigation_started(subject, queries.len()));
                log_operation_success!(
                    "start_investigation",
                    generation = generation,
                    query_count = queries.len()
                );

                Ok(StartOutcome {
                    subject: subject.to_string(),
                    queries,
                    generation,
                })
            }
            Err(err) => {
                self.transition(|session| session.finish(LoadingPhase::LoadingQueries))
                    .await;
                Err(self.fail("start_investigation", err))
            }
        }
    }

    /// Search `query` and wait for its finding
    pub async fn run_search(&self, query: &str) -> ApplicationResult<SearchOutcome> {
        match self.begin_search(query).await? {
            Ok(ticket) => Ok(self.execute_search(ticket).await),
            Err(outcome) => Ok(outcome),
        }
    }

    /// Start a search for `query` in the background.
    ///
    /// The query is claimed before this returns, so a second call for the same
    /// query is skipped even if the first search has not finished yet.
    pub async fn spawn_search(&self, query: &str) -> ApplicationResult<SearchDispatch> {
        match self.begin_search(query).await? {
            Ok(ticket) => {
                let manager = self.clone();
                let handle = tokio::spawn(async move { manager.execute_search(ticket).await });
                Ok(SearchDispatch::Started(handle))
            }
            Err(outcome) => Ok(SearchDispatch::Skipped(outcome)),
        }
    }

    /// Search every query that has not been searched yet, concurrently
    pub async fn run_all_pending(&self) -> ApplicationResult<Vec<SearchOutcome>> {
        let queries = self.session.read().await.unsearched_queries();
        info!(count = queries.len(), "Running all unsearched queries");

        let mut handles = Vec::with_capacity(queries.len());
        let mut outcomes = Vec::with_capacity(queries.len());
        for query in &queries {
            match self.spawn_search(query).await? {
                SearchDispatch::Started(handle) => handles.push(handle),
                SearchDispatch::Skipped(outcome) => outcomes.push(outcome),
            }
        }

        for result in futures::future::join_all(handles).await {
            let outcome = result.map_err(|e| {
                ApplicationError::internal_with_source("Search task failed", Box::new(e))
            })?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Ask the gateway for new search terms based on the findings so far
    pub async fn request_suggestions(&self) -> ApplicationResult<SuggestionOutcome> {
        const OPERATION: &str = "request_suggestions";

        let (blob, generation) = self
            .begin_enrichment(
                "suggestions",
                LoadingPhase::LoadingSuggestions,
                self.config.min_findings_for_suggestions,
            )
            .await?;
        log_operation_start!(OPERATION, generation = generation);

        let result = if blob.is_empty() {
            Err(GatewayError::invalid_input(messages::NO_DATA_TO_ANALYZE))
        } else {
            self.gateway.suggest_terms(&blob).await
        };

        match result {
            Ok(terms) => {
                let returned = terms.len();
                let added = self
                    .finish_enrichment(
                        OPERATION,
                        generation,
                        LoadingPhase::LoadingSuggestions,
                        |session| session.append_queries(terms),
                    )
                    .await?;

                self.notify(Notification::queries_added(added.len()));
                log_operation_success!(OPERATION, returned = returned, added = added.len());

                Ok(SuggestionOutcome {
                    skipped: returned - added.len(),
                    added,
                })
            }
            Err(err) => {
                self.abort_enrichment(generation, LoadingPhase::LoadingSuggestions)
                    .await;
                Err(self.fail(OPERATION, err))
            }
        }
    }

    /// Ask the gateway for a profile summary of the findings so far
    pub async fn request_summary(&self) -> ApplicationResult<String> {
        const OPERATION: &str = "request_summary";

        let (blob, generation) = self
            .begin_enrichment(
                "summary",
                LoadingPhase::Summarizing,
                self.config.min_findings_for_summary,
            )
            .await?;
        log_operation_start!(OPERATION, generation = generation);

        let result = if blob.is_empty() {
            Err(GatewayError::invalid_input(messages::NO_DATA_TO_SUMMARIZE))
        } else {
            self.gateway.summarize(&blob).await
        };

        match result {
            Ok(summary) => {
                let stored = summary.clone();
                self.finish_enrichment(OPERATION, generation, LoadingPhase::Summarizing, |session| {
                    session.set_summary(stored)
                })
                .await?;

                self.notify(Notification::profile_summarized());
                log_operation_success!(OPERATION, chars = summary.len());
                Ok(summary)
            }
            Err(err) => {
                self.abort_enrichment(generation, LoadingPhase::Summarizing)
                    .await;
                Err(self.fail(OPERATION, err))
            }
        }
    }

    /// Claim `query` for searching, or report why nothing needs to run
    async fn begin_search(
        &self,
        query: &str,
    ) -> ApplicationResult<Result<SearchTicket, SearchOutcome>> {
        let mut session = self.session.write().await;

        match session.begin_search(query) {
            Ok(ticket) => {
                let snapshot = session.snapshot(&self.config);
                drop(session);
                self.publish(snapshot);
                debug!(query = %query, "Search started");
                Ok(Ok(ticket))
            }
            Err(rejection) => {
                debug!(query = %query, ?rejection, "Search not started");
                rejection
                    .as_outcome()
                    .map(Err)
                    .ok_or_else(|| ApplicationError::UnknownQuery {
                        query: query.to_string(),
                    })
            }
        }
    }

    async fn execute_search(&self, ticket: SearchTicket) -> SearchOutcome {
        let finding = self.search_backend.search(ticket.query()).await;

        let mut session = self.session.write().await;
        if !session.complete_search(&ticket, finding.clone()) {
            debug!(
                query = %ticket.query(),
                generation = ticket.generation(),
                "Discarding stale search result"
            );
            return SearchOutcome::Discarded;
        }
        let snapshot = session.snapshot(&self.config);
        drop(session);

        info!(
            query = %ticket.query(),
            finding_type = %finding.finding_type,
            "Search completed"
        );
        self.publish(snapshot);
        SearchOutcome::Completed { finding }
    }

    /// Check the findings threshold, enter `phase` and serialize the findings
    async fn begin_enrichment(
        &self,
        operation: &'static str,
        phase: LoadingPhase,
        required: usize,
    ) -> ApplicationResult<(String, u64)> {
        let mut session = self.session.write().await;

        let available = session.findings().len();
        if !session.is_active() || available < required {
            return Err(ApplicationError::InsufficientFindings {
                operation,
                required,
                available,
            });
        }

        session.begin(phase);
        let prepared = (session.findings_blob(), session.generation());
        let snapshot = session.snapshot(&self.config);
        drop(session);

        self.publish(snapshot);
        Ok(prepared)
    }

    /// Apply an enrichment result, unless the investigation was replaced meanwhile
    async fn finish_enrichment<R>(
        &self,
        operation: &'static str,
        generation: u64,
        phase: LoadingPhase,
        apply: impl FnOnce(&mut InvestigationSession) -> R,
    ) -> ApplicationResult<R> {
        let mut session = self.session.write().await;
        if session.generation() != generation {
            debug!(operation, generation, "Discarding stale enrichment result");
            return Err(ApplicationError::Superseded { operation });
        }

        let result = apply(&mut *session);
        session.finish(phase);
        let snapshot = session.snapshot(&self.config);
        drop(session);

        self.publish(snapshot);
        Ok(result)
    }

    async fn abort_enrichment(&self, generation: u64, phase: LoadingPhase) {
        let mut session = self.session.write().await;
        if session.generation() != generation {
            return;
        }
        session.finish(phase);
        let snapshot = session.snapshot(&self.config);
        drop(session);

        self.publish(snapshot);
    }

    /// Apply one transition under the write lock and publish the new state
    async fn transition<R>(&self, apply: impl FnOnce(&mut InvestigationSession) -> R) -> R {
        let mut session = self.session.write().await;
        let result = apply(&mut *session);
        let snapshot = session.snapshot(&self.config);
        drop(session);

        self.publish(snapshot);
        result
    }

    /// Log a gateway failure and turn it into a fixed-message notification
    fn fail(&self, operation: &str, err: GatewayError) -> ApplicationError {
        warn!(
            operation,
            message = %err.message(),
            detail = err.detail().unwrap_or_default(),
            "Enrichment failed"
        );
        self.notify(Notification::error(err.message()));
        ApplicationError::Gateway(err)
    }

    fn notify(&self, notification: Notification) {
        // No subscribers is fine
        let _ = self.events.send(InvestigationEvent::Notification(notification));
    }

    fn publish(&self, snapshot: InvestigationSnapshot) {
        let _ = self.events.send(InvestigationEvent::StateChanged(snapshot));
    }
}
