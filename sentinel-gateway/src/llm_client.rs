//! LLM client integration using siumai
//!
//! Builds a chat client for the configured provider. The gateway only needs
//! chat completion, so every provider is exposed as a shared `ChatCapability`.

use sentinel_core::{ErrorContext, LlmConfig, SentinelError, SentinelResult};
use siumai::models;
use siumai::prelude::*;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared chat-capable client
pub type ChatClient = Arc<dyn ChatCapability + Send + Sync>;

/// Provider name that requests detection from the environment
pub const AUTO_PROVIDER: &str = "auto";

fn missing_key(provider: &str, env_var: &str) -> SentinelError {
    SentinelError::Config {
        message: format!("{} API key not found", provider),
        source: None,
        context: ErrorContext::new("llm_client")
            .with_operation("build_client")
            .with_suggestion(&format!("Set llm.api_key or the {} variable", env_var)),
    }
}

fn build_failed(config: &LlmConfig, error: impl std::fmt::Display) -> SentinelError {
    SentinelError::Llm {
        message: format!("Failed to build {} client: {}", config.provider, error),
        provider: Some(config.provider.clone()),
        model: Some(config.model.clone()),
        context: ErrorContext::new("llm_client").with_operation("build_client"),
    }
}

/// Build the appropriate siumai client based on configuration
pub async fn build_chat_client(config: &LlmConfig) -> SentinelResult<ChatClient> {
    let client: ChatClient = match config.provider.as_str() {
        "openai" => {
            let api_key = config
                .api_key
                .clone()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .ok_or_else(|| missing_key("OpenAI", "OPENAI_API_KEY"))?;

            let mut builder = LlmBuilder::new()
                .openai()
                .api_key(&api_key)
                .model(&config.model)
                .temperature(config.temperature);

            if let Some(max_tokens) = config.max_tokens {
                builder = builder.max_tokens(max_tokens);
            }

            if let Some(base_url) = &config.base_url {
                builder = builder.base_url(base_url);
            }

            let client = builder
                .build()
                .await
                .map_err(|e| build_failed(config, e))?;

            Arc::new(client)
        }
        "anthropic" => {
            let api_key = config
                .api_key
                .clone()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                .ok_or_else(|| missing_key("Anthropic", "ANTHROPIC_API_KEY"))?;

            let mut builder = LlmBuilder::new()
                .anthropic()
                .api_key(&api_key)
                .model(&config.model)
                .temperature(config.temperature);

            if let Some(max_tokens) = config.max_tokens {
                builder = builder.max_tokens(max_tokens);
            }

            let client = builder
                .build()
                .await
                .map_err(|e| build_failed(config, e))?;

            Arc::new(client)
        }
        "ollama" => {
            let base_url = config
                .base_url
                .clone()
                .or_else(|| std::env::var("OLLAMA_HOST").ok())
                .unwrap_or_else(|| "http://localhost:11434".to_string());

            let mut builder = LlmBuilder::new()
                .ollama()
                .model(&config.model)
                .base_url(&base_url)
                .temperature(config.temperature);

            if let Some(max_tokens) = config.max_tokens {
                builder = builder.max_tokens(max_tokens);
            }

            let client = builder
                .build()
                .await
                .map_err(|e| build_failed(config, e))?;

            Arc::new(client)
        }
        "groq" => {
            let api_key = config
                .api_key
                .clone()
                .or_else(|| std::env::var("GROQ_API_KEY").ok())
                .ok_or_else(|| missing_key("Groq", "GROQ_API_KEY"))?;

            let mut builder = LlmBuilder::new()
                .groq()
                .api_key(&api_key)
                .model(&config.model)
                .temperature(config.temperature);

            if let Some(max_tokens) = config.max_tokens {
                builder = builder.max_tokens(max_tokens);
            }

            let client = builder
                .build()
                .await
                .map_err(|e| build_failed(config, e))?;

            Arc::new(client)
        }
        provider => {
            return Err(SentinelError::Config {
                message: format!("Unsupported LLM provider: {}", provider),
                source: None,
                context: ErrorContext::new("llm_client")
                    .with_operation("build_client")
                    .with_suggestion("Use one of: openai, anthropic, ollama, groq, auto"),
            })
        }
    };

    info!(
        "Created LLM client for provider: {} with model: {}",
        config.provider, config.model
    );

    Ok(client)
}

/// Information about the current model
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ModelInfo {
    pub fn summary(&self) -> String {
        format!(
            "{}/{} (temp: {:.1})",
            self.provider, self.model, self.temperature
        )
    }
}

impl From<&LlmConfig> for ModelInfo {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Helper functions for creating common LLM configurations
pub mod configs {
    use super::*;

    /// Create OpenAI GPT-4o-mini configuration
    pub fn openai_gpt4o_mini() -> LlmConfig {
        LlmConfig {
            provider: "openai".to_string(),
            model: models::openai::GPT_4O_MINI.to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }

    /// Create Anthropic Claude Haiku configuration
    pub fn anthropic_claude_haiku() -> LlmConfig {
        LlmConfig {
            provider: "anthropic".to_string(),
            model: models::anthropic::CLAUDE_HAIKU_3_5.to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }

    /// Create Ollama configuration
    pub fn ollama_llama3(base_url: Option<String>) -> LlmConfig {
        LlmConfig {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            base_url: base_url.or_else(|| Some("http://localhost:11434".to_string())),
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }

    /// Create Groq configuration
    pub fn groq_llama3() -> LlmConfig {
        LlmConfig {
            provider: "groq".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
        }
    }
}

/// Create a client with automatic provider detection.
///
/// Providers with an API key in the environment are tried first; Ollama is the
/// keyless fallback.
pub async fn create_auto_client() -> SentinelResult<(LlmConfig, ChatClient)> {
    let providers = vec![
        ("openai", "OPENAI_API_KEY", configs::openai_gpt4o_mini()),
        (
            "anthropic",
            "ANTHROPIC_API_KEY",
            configs::anthropic_claude_haiku(),
        ),
        ("groq", "GROQ_API_KEY", configs::groq_llama3()),
    ];

    for (provider_name, env_var, config) in providers {
        if std::env::var(env_var).is_ok() {
            info!("Auto-detected {} provider", provider_name);
            match build_chat_client(&config).await {
                Ok(client) => return Ok((config, client)),
                Err(e) => {
                    warn!("Failed to create {} client: {}", provider_name, e);
                    continue;
                }
            }
        }
    }

    info!("Trying Ollama as fallback");
    let ollama_config = configs::ollama_llama3(std::env::var("OLLAMA_HOST").ok());
    let client = build_chat_client(&ollama_config).await?;
    Ok((ollama_config, client))
}
