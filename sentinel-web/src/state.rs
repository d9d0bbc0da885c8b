//! Application state shared by all handlers

use crate::{WebConfig, WebError, WebResult};
use sentinel_applications::{InvestigationManager, SentinelApplication};
use sentinel_core::SentinelConfig;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Main recon-sentinel application service
    pub application: Arc<SentinelApplication>,
}

impl AppState {
    /// Load the sentinel configuration and build the application
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let sentinel_config = match &config.config_path {
            Some(path) => {
                info!(path = %path, "Loading sentinel configuration");
                SentinelConfig::from_file(path)
                    .map_err(|e| WebError::Config(format!("Failed to load {}: {}", path, e)))?
            }
            None => SentinelConfig::default(),
        };

        let application = SentinelApplication::new(sentinel_config).await?;
        Ok(Self::with_application(config, application))
    }

    /// Wrap an already built application
    pub fn with_application(config: WebConfig, application: SentinelApplication) -> Self {
        Self {
            config,
            application: Arc::new(application),
        }
    }

    pub fn investigations(&self) -> &InvestigationManager {
        self.application.investigations()
    }
}
