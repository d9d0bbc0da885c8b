//! Tests for the LLM-backed enrichment gateway with a scripted chat model

use sentinel_core::{EnrichmentGateway, GatewayError};
use sentinel_gateway::{messages, LlmEnrichmentGateway};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock chat model returning a fixed reply and counting calls
struct ScriptedChatModel {
    reply: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedChatModel {
    fn replying(reply: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                reply: Some(reply.to_string()),
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    fn failing() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                reply: None,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

#[async_trait::async_trait]
impl siumai::prelude::ChatCapability for ScriptedChatModel {
    async fn chat_with_tools<'a>(
        &'a self,
        _messages: Vec<siumai::prelude::ChatMessage>,
        _tools: Option<Vec<siumai::prelude::Tool>>,
    ) -> Result<siumai::prelude::ChatResponse, siumai::prelude::LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(reply) = &self.reply else {
            return Err(siumai::prelude::LlmError::UnsupportedOperation(
                "provider unavailable: secret-internal-detail".to_string(),
            ));
        };

        Ok(siumai::prelude::ChatResponse {
            id: Some("mock-response".to_string()),
            content: siumai::prelude::MessageContent::Text(reply.clone()),
            model: Some("mock-model".to_string()),
            usage: None,
            finish_reason: Some(siumai::prelude::FinishReason::Stop),
            tool_calls: None,
            thinking: None,
            metadata: std::collections::HashMap::new(),
        })
    }

    async fn chat_stream<'a>(
        &'a self,
        _messages: Vec<siumai::prelude::ChatMessage>,
        _tools: Option<Vec<siumai::prelude::Tool>>,
    ) -> Result<siumai::prelude::ChatStream, siumai::prelude::LlmError> {
        Err(siumai::prelude::LlmError::UnsupportedOperation(
            "Streaming not supported in mock".to_string(),
        ))
    }
}

fn gateway(model: ScriptedChatModel) -> LlmEnrichmentGateway {
    LlmEnrichmentGateway::new(Arc::new(model))
}

#[tokio::test]
async fn test_generate_queries_parses_fenced_json() {
    let (model, calls) = ScriptedChatModel::replying(
        "```json\n{\"queries\": [\"John Doe LinkedIn\", \"John Doe address\"]}\n```",
    );
    let gateway = gateway(model);

    let queries = gateway.generate_queries("John Doe").await.unwrap();
    assert_eq!(queries, vec!["John Doe LinkedIn", "John Doe address"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_suggest_terms_accepts_bare_array() {
    let (model, _) = ScriptedChatModel::replying(r#"["Jane Smith", "Acme Corporation"]"#);
    let gateway = gateway(model);

    let terms = gateway
        .suggest_terms("Known associate: Jane Smith\nWorks at: Acme Corporation")
        .await
        .unwrap();
    assert_eq!(terms, vec!["Jane Smith", "Acme Corporation"]);
}

#[tokio::test]
async fn test_summarize_returns_summary_text() {
    let (model, _) = ScriptedChatModel::replying(r#"{"summary": "Works at Acme Corporation."}"#);
    let gateway = gateway(model);

    let summary = gateway.summarize("Works at: Acme Corporation").await.unwrap();
    assert_eq!(summary, "Works at Acme Corporation.");
}

#[tokio::test]
async fn test_empty_input_never_reaches_model() {
    let (model, calls) = ScriptedChatModel::replying(r#"{"queries": []}"#);
    let gateway = gateway(model);

    assert_eq!(
        gateway.generate_queries("   ").await,
        Err(GatewayError::invalid_input(messages::INVALID_SUBJECT))
    );
    assert_eq!(
        gateway.suggest_terms("").await,
        Err(GatewayError::invalid_input(messages::NO_DATA_TO_ANALYZE))
    );
    assert_eq!(
        gateway.summarize("").await,
        Err(GatewayError::invalid_input(messages::NO_DATA_TO_SUMMARIZE))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_model_failure_yields_fixed_message() {
    let (model, _) = ScriptedChatModel::failing();
    let gateway = gateway(model);

    let err = gateway.summarize("Works at: Acme").await.unwrap_err();
    assert_eq!(err.message(), messages::SUMMARY_FAILED);
    assert!(!err.message().contains("secret-internal-detail"));
    assert!(err
        .detail()
        .map(|d| d.contains("secret-internal-detail"))
        .unwrap_or(false));
}

#[tokio::test]
async fn test_malformed_output_is_a_failure() {
    let (model, _) = ScriptedChatModel::replying("I could not find anything, sorry.");
    let gateway = gateway(model);

    let err = gateway.generate_queries("John Doe").await.unwrap_err();
    assert_eq!(err.message(), messages::QUERIES_FAILED);

    let (model, _) = ScriptedChatModel::replying(r#"{"suggestedSearchTerms": "one"}"#);
    let gateway = LlmEnrichmentGateway::new(Arc::new(model));
    let err = gateway.suggest_terms("A: b").await.unwrap_err();
    assert_eq!(err.message(), messages::SUGGESTIONS_FAILED);
}
