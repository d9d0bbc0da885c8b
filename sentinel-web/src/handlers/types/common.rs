//! Common types used across multiple handlers

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Model behind the enrichment gateway, if known
    #[schema(example = "openai/gpt-4o-mini (temp: 0.7)")]
    pub model: Option<String>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Subject must be at least 2 characters.")]
    pub error: String,
    /// Offending request field, for validation errors
    #[schema(example = "subject")]
    pub field: Option<String>,
}
