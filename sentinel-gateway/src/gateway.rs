//! Language-model-backed implementation of the enrichment gateway

use crate::llm_client::{
    build_chat_client, create_auto_client, ChatClient, ModelInfo, AUTO_PROVIDER,
};
use crate::parsing::{parse_string_list, parse_summary};
use crate::prompts::{
    create_initial_queries_prompt, create_suggest_terms_prompt, create_summary_prompt,
    OSINT_ANALYST_SYSTEM_PROMPT,
};
use async_trait::async_trait;
use sentinel_core::{
    performance::measure_async, EnrichmentGateway, GatewayError, GatewayResult, LlmConfig,
    SentinelResult,
};
use siumai::prelude::ChatMessage;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Fixed user-facing messages of the gateway
pub mod messages {
    pub const INVALID_SUBJECT: &str = "Invalid subject.";
    pub const NO_DATA_TO_ANALYZE: &str = "No data to analyze.";
    pub const NO_DATA_TO_SUMMARIZE: &str = "No data to summarize.";
    pub const QUERIES_FAILED: &str = "Failed to generate initial queries. Please try again.";
    pub const SUGGESTIONS_FAILED: &str = "Failed to get new suggestions. Please try again.";
    pub const SUMMARY_FAILED: &str = "Failed to generate summary. Please try again.";
}

/// Enrichment gateway that prompts a chat model and validates its JSON output
pub struct LlmEnrichmentGateway {
    client: ChatClient,
    model: Option<ModelInfo>,
}

impl LlmEnrichmentGateway {
    /// Wrap an existing chat client
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            model: None,
        }
    }

    /// Build the chat client described by `config`.
    ///
    /// The provider `"auto"` picks the first provider with credentials in the
    /// environment and falls back to a local Ollama.
    pub async fn from_config(config: &LlmConfig) -> SentinelResult<Self> {
        if config.provider == AUTO_PROVIDER {
            let (detected, client) = create_auto_client().await?;
            return Ok(Self {
                client,
                model: Some(ModelInfo::from(&detected)),
            });
        }

        let client = build_chat_client(config).await?;
        Ok(Self {
            client,
            model: Some(ModelInfo::from(config)),
        })
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.model.as_ref()
    }

    /// Run one chat completion; errors are returned as raw detail strings
    async fn complete(&self, operation: &str, prompt: String) -> Result<String, String> {
        let start_time = Instant::now();
        let messages = vec![
            ChatMessage::system(OSINT_ANALYST_SYSTEM_PROMPT).build(),
            ChatMessage::user(prompt).build(),
        ];

        let response = measure_async(operation, self.client.chat_with_tools(messages, None))
            .await
            .map_err(|e| format!("LLM call failed: {}", e))?;

        let content = response
            .content_text()
            .map(str::to_string)
            .ok_or_else(|| "No text content in LLM response".to_string())?;

        info!(
            operation,
            duration_ms = start_time.elapsed().as_millis() as u64,
            chars = content.len(),
            "Enrichment call completed"
        );
        debug!(operation, response = %content, "Raw model output");

        Ok(content)
    }
}

fn fail(operation: &str, message: &str, detail: String) -> GatewayError {
    warn!(operation, detail = %detail, "Enrichment call failed");
    GatewayError::failed(message, detail)
}

#[async_trait]
impl EnrichmentGateway for LlmEnrichmentGateway {
    async fn generate_queries(&self, subject: &str) -> GatewayResult<Vec<String>> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(GatewayError::invalid_input(messages::INVALID_SUBJECT));
        }

        let response = self
            .complete("generate_queries", create_initial_queries_prompt(subject))
            .await
            .map_err(|detail| fail("generate_queries", messages::QUERIES_FAILED, detail))?;

        parse_string_list(&response, "queries")
            .map_err(|detail| fail("generate_queries", messages::QUERIES_FAILED, detail))
    }

    async fn suggest_terms(&self, existing_data: &str) -> GatewayResult<Vec<String>> {
        if existing_data.trim().is_empty() {
            return Err(GatewayError::invalid_input(messages::NO_DATA_TO_ANALYZE));
        }

        let response = self
            .complete("suggest_terms", create_suggest_terms_prompt(existing_data))
            .await
            .map_err(|detail| fail("suggest_terms", messages::SUGGESTIONS_FAILED, detail))?;

        parse_string_list(&response, "suggestedSearchTerms")
            .map_err(|detail| fail("suggest_terms", messages::SUGGESTIONS_FAILED, detail))
    }

    async fn summarize(&self, aggregated_data: &str) -> GatewayResult<String> {
        if aggregated_data.trim().is_empty() {
            return Err(GatewayError::invalid_input(messages::NO_DATA_TO_SUMMARIZE));
        }

        let response = self
            .complete("summarize", create_summary_prompt(aggregated_data))
            .await
            .map_err(|detail| fail("summarize", messages::SUMMARY_FAILED, detail))?;

        parse_summary(&response).map_err(|detail| fail("summarize", messages::SUMMARY_FAILED, detail))
    }
}
