//! Core trait definitions

use crate::error::GatewayResult;
use crate::types::Finding;
use async_trait::async_trait;

/// Boundary over the language-model-backed enrichment calls.
///
/// Implementations validate their input before contacting the model and never
/// let an underlying failure escape as anything but a [`crate::GatewayError`].
#[async_trait]
pub trait EnrichmentGateway: Send + Sync {
    /// Generate initial search queries for a subject
    async fn generate_queries(&self, subject: &str) -> GatewayResult<Vec<String>>;

    /// Suggest new search terms from the findings gathered so far
    async fn suggest_terms(&self, existing_data: &str) -> GatewayResult<Vec<String>>;

    /// Summarize aggregated findings into a profile
    async fn summarize(&self, aggregated_data: &str) -> GatewayResult<String>;
}

/// Search execution backend producing exactly one finding per query.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Finding;
}
