//! Sentinel Gateway - enrichment calls backed by a language model
//!
//! Exposes the three enrichment operations of an investigation (initial query
//! generation, search term suggestion and profile summarization) behind the
//! [`sentinel_core::EnrichmentGateway`] trait. Every failure of the underlying
//! model call is translated into a uniform [`sentinel_core::GatewayError`].

pub mod gateway;
pub mod llm_client;
pub mod parsing;
pub mod prompts;

pub use gateway::{messages, LlmEnrichmentGateway};
pub use llm_client::{
    build_chat_client, create_auto_client, ChatClient, ModelInfo, AUTO_PROVIDER,
};
