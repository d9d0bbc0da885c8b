//! Investigation workflow tests with scripted collaborators

use async_trait::async_trait;
use sentinel_applications::{
    ApplicationError, InvestigationEvent, InvestigationManager, MockSearchSimulator,
    NotificationSeverity, SearchDispatch, SearchOutcome,
};
use sentinel_core::{
    EnrichmentGateway, Finding, FindingType, GatewayError, GatewayResult, InvestigationConfig,
    LoadingPhase, SearchBackend,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

const QUERIES_FAILED: &str = "Failed to generate initial queries. Please try again.";
const SUMMARY_FAILED: &str = "Failed to generate summary. Please try again.";

/// Gateway answering from queued scripted replies
#[derive(Default)]
struct ScriptedGateway {
    queries: Mutex<VecDeque<GatewayResult<Vec<String>>>>,
    suggestions: Mutex<VecDeque<GatewayResult<Vec<String>>>>,
    summaries: Mutex<VecDeque<GatewayResult<String>>>,
    calls: AtomicUsize,
    /// When set, suggestion calls wait for a notification before answering
    suggestion_gate: Option<Arc<Notify>>,
}

impl ScriptedGateway {
    fn push_queries(&self, queries: &[&str]) {
        self.queries
            .lock()
            .unwrap()
            .push_back(Ok(queries.iter().map(|q| q.to_string()).collect()));
    }

    fn push_queries_error(&self, message: &str) {
        self.queries
            .lock()
            .unwrap()
            .push_back(Err(GatewayError::failed(message, "upstream exploded")));
    }

    fn push_suggestions(&self, terms: &[&str]) {
        self.suggestions
            .lock()
            .unwrap()
            .push_back(Ok(terms.iter().map(|q| q.to_string()).collect()));
    }

    fn push_summary(&self, result: GatewayResult<String>) {
        self.summaries.lock().unwrap().push_back(result);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnrichmentGateway for ScriptedGateway {
    async fn generate_queries(&self, _subject: &str) -> GatewayResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::failed(QUERIES_FAILED, "no script")))
    }

    async fn suggest_terms(&self, _existing_data: &str) -> GatewayResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.suggestion_gate {
            gate.notified().await;
        }
        self.suggestions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn summarize(&self, _aggregated_data: &str) -> GatewayResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.summaries
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::failed(SUMMARY_FAILED, "no script")))
    }
}

/// Search backend whose searches finish only when released per query
#[derive(Default)]
struct GatedSearchBackend {
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl GatedSearchBackend {
    fn gate(&self, query: &str) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    fn release(&self, query: &str) {
        self.gate(query).notify_one();
    }
}

#[async_trait]
impl SearchBackend for GatedSearchBackend {
    async fn search(&self, query: &str) -> Finding {
        self.gate(query).notified().await;
        Finding::new(
            FindingType::Other,
            "Gated finding",
            format!("Based on the query: \"{}\"", query),
            query,
        )
    }
}

fn manager_with(gateway: Arc<ScriptedGateway>) -> InvestigationManager {
    InvestigationManager::new(
        gateway,
        Arc::new(MockSearchSimulator::instant()),
        InvestigationConfig::default(),
    )
}

fn gated_manager(
    gateway: Arc<ScriptedGateway>,
) -> (InvestigationManager, Arc<GatedSearchBackend>) {
    let backend = Arc::new(GatedSearchBackend::default());
    let manager = InvestigationManager::new(
        gateway,
        backend.clone(),
        InvestigationConfig::default(),
    );
    (manager, backend)
}

/// Scenario A setup: "John Doe" with two initial queries
async fn started(gateway: &Arc<ScriptedGateway>, manager: &InvestigationManager) {
    gateway.push_queries(&["John Doe LinkedIn", "John Doe address"]);
    manager.start_investigation("John Doe").await.unwrap();
}

async fn wait_for_pending(manager: &InvestigationManager, count: usize) {
    for _ in 0..100 {
        if manager.snapshot().await.pending_queries.len() == count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("searches never reached {} pending", count);
}

#[tokio::test]
async fn test_scenario_a_start_investigation() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());

    started(&gateway, &manager).await;

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.subject.as_deref(), Some("John Doe"));
    assert_eq!(snapshot.queries, vec!["John Doe LinkedIn", "John Doe address"]);
    assert!(snapshot.findings.is_empty());
    assert!(snapshot.completed_queries.is_empty());
    assert!(snapshot.summary.is_none());
    assert_eq!(snapshot.loading_phase, LoadingPhase::Idle);
}

#[tokio::test]
async fn test_scenario_b_sequential_searches() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    started(&gateway, &manager).await;

    for query in ["John Doe LinkedIn", "John Doe address"] {
        let outcome = manager.run_search(query).await.unwrap();
        assert_eq!(outcome.finding().unwrap().source_query, query);
    }

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.findings.len(), 2);
    assert_eq!(snapshot.completed_queries.len(), 2);
    // Newest first
    assert_eq!(snapshot.findings[0].source_query, "John Doe address");
    assert_eq!(snapshot.findings[1].source_query, "John Doe LinkedIn");
    assert_eq!(snapshot.loading_phase, LoadingPhase::Idle);
}

#[tokio::test]
async fn test_scenario_c_suggestions_are_deduplicated() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    started(&gateway, &manager).await;
    manager.run_all_pending().await.unwrap();

    gateway.push_suggestions(&["John Doe address", "John Doe phone"]);
    let outcome = manager.request_suggestions().await.unwrap();

    assert_eq!(outcome.added, vec!["John Doe phone"]);
    assert_eq!(outcome.skipped, 1);
    let snapshot = manager.snapshot().await;
    assert_eq!(
        snapshot.queries,
        vec!["John Doe LinkedIn", "John Doe address", "John Doe phone"]
    );
    assert_eq!(snapshot.loading_phase, LoadingPhase::Idle);
}

#[tokio::test]
async fn test_scenario_d_summary_failure_keeps_state() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    gateway.push_queries(&["a", "b", "c"]);
    manager.start_investigation("John Doe").await.unwrap();
    manager.run_all_pending().await.unwrap();
    let before = manager.snapshot().await;

    let mut events = manager.subscribe();
    gateway.push_summary(Err(GatewayError::failed(SUMMARY_FAILED, "HTTP 500 secret")));
    let err = manager.request_summary().await.unwrap_err();

    assert!(matches!(err, ApplicationError::Gateway(_)));
    assert_eq!(err.to_string(), SUMMARY_FAILED);

    let after = manager.snapshot().await;
    assert!(after.summary.is_none());
    assert_eq!(after.findings, before.findings);
    assert_eq!(after.loading_phase, LoadingPhase::Idle);

    let mut saw_error = false;
    while let Ok(event) = events.try_recv() {
        if let InvestigationEvent::Notification(notification) = event {
            assert_eq!(notification.severity, NotificationSeverity::Error);
            assert_eq!(notification.title, "Error");
            assert_eq!(notification.description, SUMMARY_FAILED);
            assert!(!notification.description.contains("secret"));
            saw_error = true;
        }
    }
    assert!(saw_error);
}

#[tokio::test]
async fn test_summary_success_overwrites() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    gateway.push_queries(&["a", "b", "c"]);
    manager.start_investigation("John Doe").await.unwrap();
    manager.run_all_pending().await.unwrap();

    gateway.push_summary(Ok("First profile.".to_string()));
    gateway.push_summary(Ok("Second profile.".to_string()));

    assert_eq!(manager.request_summary().await.unwrap(), "First profile.");
    assert_eq!(manager.request_summary().await.unwrap(), "Second profile.");
    assert_eq!(
        manager.snapshot().await.summary.as_deref(),
        Some("Second profile.")
    );
}

#[tokio::test]
async fn test_subject_length_bounds() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());

    let too_long = "x".repeat(51);
    for subject in ["", "J", too_long.as_str()] {
        let err = manager.start_investigation(subject).await.unwrap_err();
        match err {
            ApplicationError::Validation { field, .. } => assert_eq!(field, "subject"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
    assert_eq!(gateway.calls(), 0);
    assert!(!manager.snapshot().await.is_active());

    // Bounds are inclusive and counted in characters
    assert!(manager.validate_subject("Jo").is_ok());
    assert!(manager.validate_subject(&"é".repeat(50)).is_ok());
    assert_eq!(
        manager.validate_subject("J").unwrap_err().to_string(),
        "Subject must be at least 2 characters."
    );
    assert_eq!(
        manager.validate_subject(&too_long).unwrap_err().to_string(),
        "Subject must be 50 characters or less."
    );
}

#[tokio::test]
async fn test_failed_start_preserves_previous_investigation() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    started(&gateway, &manager).await;
    manager.run_search("John Doe LinkedIn").await.unwrap();
    let before = manager.snapshot().await;

    gateway.push_queries_error(QUERIES_FAILED);
    let err = manager.start_investigation("Jane Roe").await.unwrap_err();
    assert_eq!(err.to_string(), QUERIES_FAILED);

    let after = manager.snapshot().await;
    assert_eq!(after.subject.as_deref(), Some("John Doe"));
    assert_eq!(after.queries, before.queries);
    assert_eq!(after.findings, before.findings);
    assert_eq!(after.generation, before.generation);
    assert_eq!(after.loading_phase, LoadingPhase::Idle);
}

#[tokio::test]
async fn test_new_investigation_resets_state() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    started(&gateway, &manager).await;
    manager.run_all_pending().await.unwrap();

    gateway.push_queries(&["Jane Roe Twitter", "Jane Roe Twitter", "Jane Roe employer"]);
    let outcome = manager.start_investigation("Jane Roe").await.unwrap();
    assert_eq!(outcome.queries, vec!["Jane Roe Twitter", "Jane Roe employer"]);

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.subject.as_deref(), Some("Jane Roe"));
    assert!(snapshot.findings.is_empty());
    assert!(snapshot.completed_queries.is_empty());
    assert!(snapshot.summary.is_none());
}

#[tokio::test]
async fn test_search_is_idempotent() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    started(&gateway, &manager).await;

    manager.run_search("John Doe LinkedIn").await.unwrap();
    let before = manager.snapshot().await;

    let outcome = manager.run_search("John Doe LinkedIn").await.unwrap();
    assert_eq!(outcome, SearchOutcome::AlreadyCompleted);
    assert_eq!(manager.snapshot().await, before);
}

#[tokio::test]
async fn test_unknown_query_is_rejected() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    started(&gateway, &manager).await;

    let err = manager.run_search("Not a query").await.unwrap_err();
    assert!(matches!(err, ApplicationError::UnknownQuery { .. }));
    assert!(manager.snapshot().await.findings.is_empty());
}

#[tokio::test]
async fn test_completed_and_findings_only_grow() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    gateway.push_queries(&["a", "b", "c", "d"]);
    manager.start_investigation("John Doe").await.unwrap();

    let mut last_completed = 0;
    let mut last_findings = 0;
    for query in ["a", "b", "a", "c", "d", "c"] {
        manager.run_search(query).await.unwrap();
        let snapshot = manager.snapshot().await;
        assert!(snapshot.completed_queries.len() >= last_completed);
        assert!(snapshot.findings.len() >= last_findings);
        last_completed = snapshot.completed_queries.len();
        last_findings = snapshot.findings.len();
    }
    assert_eq!(last_completed, 4);
    assert_eq!(last_findings, 4);
}

#[tokio::test]
async fn test_guards_require_enough_findings() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());

    // No investigation yet
    assert!(matches!(
        manager.request_suggestions().await,
        Err(ApplicationError::InsufficientFindings { .. })
    ));

    started(&gateway, &manager).await;
    manager.run_search("John Doe LinkedIn").await.unwrap();
    let calls = gateway.calls();

    match manager.request_suggestions().await.unwrap_err() {
        ApplicationError::InsufficientFindings {
            required,
            available,
            ..
        } => {
            assert_eq!(required, 2);
            assert_eq!(available, 1);
        }
        other => panic!("expected insufficient findings, got {:?}", other),
    }

    manager.run_search("John Doe address").await.unwrap();
    assert!(matches!(
        manager.request_summary().await,
        Err(ApplicationError::InsufficientFindings { required: 3, .. })
    ));

    assert_eq!(gateway.calls(), calls);
    let snapshot = manager.snapshot().await;
    assert!(snapshot.can_request_suggestions);
    assert!(!snapshot.can_request_summary);
    assert_eq!(snapshot.loading_phase, LoadingPhase::Idle);
}

#[tokio::test]
async fn test_stale_search_is_discarded() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (manager, backend) = gated_manager(gateway.clone());
    started(&gateway, &manager).await;

    let handle = match manager.spawn_search("John Doe LinkedIn").await.unwrap() {
        SearchDispatch::Started(handle) => handle,
        SearchDispatch::Skipped(outcome) => panic!("search skipped: {:?}", outcome),
    };

    // Same query text in the new investigation must not absorb the old result
    gateway.push_queries(&["John Doe LinkedIn"]);
    manager.start_investigation("Someone Else").await.unwrap();

    backend.release("John Doe LinkedIn");
    assert_eq!(handle.await.unwrap(), SearchOutcome::Discarded);

    let snapshot = manager.snapshot().await;
    assert!(snapshot.findings.is_empty());
    assert!(snapshot.completed_queries.is_empty());
    assert_eq!(snapshot.loading_phase, LoadingPhase::Idle);
}

#[tokio::test]
async fn test_overlapping_searches_keep_searching_phase() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (manager, backend) = gated_manager(gateway.clone());
    started(&gateway, &manager).await;

    let first = manager.spawn_search("John Doe LinkedIn").await.unwrap();
    let second = manager.spawn_search("John Doe address").await.unwrap();
    assert!(matches!(
        manager.spawn_search("John Doe address").await.unwrap(),
        SearchDispatch::Skipped(SearchOutcome::AlreadyPending)
    ));

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.loading_phase, LoadingPhase::Searching);
    assert_eq!(snapshot.pending_queries.len(), 2);

    // Complete out of order
    backend.release("John Doe address");
    let SearchDispatch::Started(second) = second else {
        panic!("second search not started");
    };
    assert!(second.await.unwrap().finding().is_some());

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.loading_phase, LoadingPhase::Searching);
    assert_eq!(snapshot.completed_queries, vec!["John Doe address"]);

    backend.release("John Doe LinkedIn");
    let SearchDispatch::Started(first) = first else {
        panic!("first search not started");
    };
    assert!(first.await.unwrap().finding().is_some());

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.loading_phase, LoadingPhase::Idle);
    assert_eq!(snapshot.findings.len(), 2);
    assert_eq!(snapshot.findings[0].source_query, "John Doe LinkedIn");
}

#[tokio::test]
async fn test_search_completion_keeps_other_phase() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (manager, backend) = gated_manager(gateway.clone());
    gateway.push_queries(&["a", "b", "c"]);
    manager.start_investigation("John Doe").await.unwrap();

    for query in ["a", "b"] {
        backend.release(query);
        manager.run_search(query).await.unwrap();
    }

    let SearchDispatch::Started(search) = manager.spawn_search("c").await.unwrap() else {
        panic!("search not started");
    };
    wait_for_pending(&manager, 1).await;

    gateway.push_suggestions(&["d"]);
    let outcome = manager.request_suggestions().await.unwrap();
    assert_eq!(outcome.added, vec!["d"]);
    // The search is still in flight
    assert_eq!(manager.snapshot().await.loading_phase, LoadingPhase::Searching);

    backend.release("c");
    search.await.unwrap();
    assert_eq!(manager.snapshot().await.loading_phase, LoadingPhase::Idle);
}

#[tokio::test]
async fn test_search_during_suggestions_keeps_suggestion_phase() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(ScriptedGateway {
        suggestion_gate: Some(gate.clone()),
        ..Default::default()
    });
    let (manager, backend) = gated_manager(gateway.clone());
    gateway.push_queries(&["a", "b", "c"]);
    manager.start_investigation("John Doe").await.unwrap();
    for query in ["a", "b"] {
        backend.release(query);
        manager.run_search(query).await.unwrap();
    }

    gateway.push_suggestions(&["d"]);
    let pending = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.request_suggestions().await })
    };
    while manager.snapshot().await.loading_phase != LoadingPhase::LoadingSuggestions {
        tokio::task::yield_now().await;
    }

    backend.release("c");
    manager.run_search("c").await.unwrap();
    assert_eq!(
        manager.snapshot().await.loading_phase,
        LoadingPhase::LoadingSuggestions
    );

    gate.notify_one();
    let outcome = pending.await.unwrap().unwrap();
    assert_eq!(outcome.added, vec!["d"]);
    assert_eq!(manager.snapshot().await.loading_phase, LoadingPhase::Idle);
}

#[tokio::test]
async fn test_stale_suggestions_are_discarded() {
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(ScriptedGateway {
        suggestion_gate: Some(gate.clone()),
        ..Default::default()
    });
    let manager = manager_with(gateway.clone());
    started(&gateway, &manager).await;
    manager.run_all_pending().await.unwrap();

    gateway.push_suggestions(&["John Doe phone"]);
    let pending = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.request_suggestions().await })
    };
    while manager.snapshot().await.loading_phase != LoadingPhase::LoadingSuggestions {
        tokio::task::yield_now().await;
    }

    gateway.push_queries(&["Jane Roe employer"]);
    manager.start_investigation("Jane Roe").await.unwrap();
    gate.notify_one();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, ApplicationError::Superseded { .. }));
    assert_eq!(manager.snapshot().await.queries, vec!["Jane Roe employer"]);
}

#[tokio::test]
async fn test_events_follow_operations() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    let mut events = manager.subscribe();

    started(&gateway, &manager).await;

    let mut phases = Vec::new();
    let mut notifications = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            InvestigationEvent::StateChanged(snapshot) => phases.push(snapshot.loading_phase),
            InvestigationEvent::Notification(notification) => notifications.push(notification),
        }
    }

    assert_eq!(phases, vec![LoadingPhase::LoadingQueries, LoadingPhase::Idle]);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Investigation Started");
    assert_eq!(
        notifications[0].description,
        "Generated 2 initial queries for \"John Doe\"."
    );
}

#[tokio::test]
async fn test_run_all_pending_searches_every_query() {
    let gateway = Arc::new(ScriptedGateway::default());
    let manager = manager_with(gateway.clone());
    gateway.push_queries(&["a", "b", "c"]);
    manager.start_investigation("John Doe").await.unwrap();
    manager.run_search("b").await.unwrap();

    let outcomes = manager.run_all_pending().await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.finding().is_some()));

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.completed_queries, vec!["a", "b", "c"]);
    assert!(manager.run_all_pending().await.unwrap().is_empty());
}
