//! Sentinel Applications - the investigation workflow
//!
//! This module builds the user-facing investigation workflow on top of the
//! enrichment gateway and a search backend:
//!
//! - Investigation session state and its transitions
//! - Concurrent searches with stale-result detection
//! - Suggestions and profile summaries through the enrichment gateway
//! - Notification and state-change events for presentation layers
//!
//! ## Architecture
//!
//! - **Core** (sentinel-core): shared types, contracts, config and logging
//! - **Gateway** (sentinel-gateway): language-model-backed enrichment
//! - **Applications** (this module): the investigation session
//! - **Presentation** (sentinel-web/cli): user interfaces

pub mod investigation;
pub mod simulator;

pub use investigation::{
    InvestigationEvent, InvestigationManager, InvestigationSnapshot, Notification,
    NotificationSeverity, SearchDispatch, SearchOutcome, StartOutcome, SuggestionOutcome,
};
pub use simulator::MockSearchSimulator;

use sentinel_core::{EnrichmentGateway, GatewayError, SearchBackend, SentinelConfig};
use sentinel_gateway::{LlmEnrichmentGateway, ModelInfo};
use std::sync::Arc;
use tracing::info;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Unknown query: {query}")]
    UnknownQuery { query: String },

    #[error("At least {required} findings are required for {operation} ({available} available)")]
    InsufficientFindings {
        operation: &'static str,
        required: usize,
        available: usize,
    },

    /// Carries only the gateway's user-facing message
    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("The investigation was replaced before the {operation} result arrived")]
    Superseded { operation: &'static str },

    #[error("Core error: {0}")]
    Core(#[from] sentinel_core::SentinelError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    /// Create a field-level validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an internal error with source
    pub fn internal_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source),
        }
    }
}

/// Main recon-sentinel application service
pub struct SentinelApplication {
    investigations: InvestigationManager,
    model: Option<ModelInfo>,
    config: SentinelConfig,
}

/// Builder for SentinelApplication to simplify initialization
pub struct SentinelApplicationBuilder {
    config: SentinelConfig,
    gateway: Option<Arc<dyn EnrichmentGateway>>,
    search_backend: Option<Arc<dyn SearchBackend>>,
}

impl SentinelApplicationBuilder {
    /// Create a new builder with the given configuration
    pub fn new(config: SentinelConfig) -> Self {
        Self {
            config,
            gateway: None,
            search_backend: None,
        }
    }

    /// Use a custom enrichment gateway instead of the configured model
    pub fn with_gateway(mut self, gateway: Arc<dyn EnrichmentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Use a custom search backend instead of the simulator
    pub fn with_search_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.search_backend = Some(backend);
        self
    }

    /// Build the SentinelApplication
    pub async fn build(self) -> ApplicationResult<SentinelApplication> {
        self.config.validate()?;

        let (gateway, model) = match self.gateway {
            Some(gateway) => (gateway, None),
            None => {
                let gateway = LlmEnrichmentGateway::from_config(&self.config.llm).await?;
                let model = gateway.model_info().cloned();
                (Arc::new(gateway) as Arc<dyn EnrichmentGateway>, model)
            }
        };

        let search_backend = self.search_backend.unwrap_or_else(|| {
            Arc::new(MockSearchSimulator::new(&self.config.simulator)) as Arc<dyn SearchBackend>
        });

        if let Some(model) = &model {
            info!(model = %model.summary(), "Enrichment gateway ready");
        }

        let investigations =
            InvestigationManager::new(gateway, search_backend, self.config.investigation.clone());

        Ok(SentinelApplication {
            investigations,
            model,
            config: self.config,
        })
    }
}

impl SentinelApplication {
    /// Create a new application with the configured model and the search simulator
    pub async fn new(config: SentinelConfig) -> ApplicationResult<Self> {
        SentinelApplicationBuilder::new(config).build().await
    }

    /// Create a builder for more advanced configuration
    pub fn builder(config: SentinelConfig) -> SentinelApplicationBuilder {
        SentinelApplicationBuilder::new(config)
    }

    pub fn investigations(&self) -> &InvestigationManager {
        &self.investigations
    }

    /// Model behind the enrichment gateway, when built from configuration
    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.model.as_ref()
    }

    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }
}
