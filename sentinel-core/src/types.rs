//! Core data type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a discovered finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingType {
    Person,
    Place,
    Organization,
    Document,
    Social,
    Other,
}

impl FindingType {
    pub const ALL: [FindingType; 6] = [
        FindingType::Person,
        FindingType::Place,
        FindingType::Organization,
        FindingType::Document,
        FindingType::Social,
        FindingType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingType::Person => "person",
            FindingType::Place => "place",
            FindingType::Organization => "organization",
            FindingType::Document => "document",
            FindingType::Social => "social",
            FindingType::Other => "other",
        }
    }
}

impl fmt::Display for FindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single discrete piece of discovered information, tied to the query that produced it.
///
/// Findings are immutable once created; `id` is generated at creation time and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub title: String,
    pub content: String,
    pub source_query: String,
    pub discovered_at: DateTime<Utc>,
}

impl Finding {
    /// Create a finding with a fresh identity
    pub fn new(
        finding_type: FindingType,
        title: impl Into<String>,
        content: impl Into<String>,
        source_query: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("finding-{}", uuid::Uuid::new_v4()),
            finding_type,
            title: title.into(),
            content: content.into(),
            source_query: source_query.into(),
            discovered_at: Utc::now(),
        }
    }

    /// Line used when findings are aggregated into a text blob for enrichment
    pub fn as_data_line(&self) -> String {
        format!("{}: {}", self.title, self.content)
    }
}

/// The session's current in-flight operation category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadingPhase {
    #[default]
    Idle,
    LoadingQueries,
    Searching,
    LoadingSuggestions,
    Summarizing,
}

impl LoadingPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, LoadingPhase::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadingPhase::Idle => "idle",
            LoadingPhase::LoadingQueries => "loading-queries",
            LoadingPhase::Searching => "searching",
            LoadingPhase::LoadingSuggestions => "loading-suggestions",
            LoadingPhase::Summarizing => "summarizing",
        }
    }
}

impl fmt::Display for LoadingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 配置信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentinelConfig {
    pub llm: LlmConfig,
    pub simulator: SimulatorConfig,
    pub investigation: InvestigationConfig,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type (openai, anthropic, ollama, groq, or auto to detect)
    pub provider: String,
    /// Model name
    pub model: String,
    /// API key (optional, can be set via environment)
    pub api_key: Option<String>,
    /// Base URL for custom providers
    pub base_url: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

/// Mock search simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Lower bound of the simulated search latency
    pub min_delay_ms: u64,
    /// Upper bound of the simulated search latency
    pub max_delay_ms: u64,
    /// Seed for deterministic finding selection
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationConfig {
    /// Minimum subject length in characters
    pub subject_min_len: usize,
    /// Maximum subject length in characters
    pub subject_max_len: usize,
    /// Findings required before suggestions can be requested
    pub min_findings_for_suggestions: usize,
    /// Findings required before a summary can be requested
    pub min_findings_for_summary: usize,
    /// Capacity of the event broadcast channel
    pub event_buffer: usize,
}
