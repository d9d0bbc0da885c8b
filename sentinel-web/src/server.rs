//! Sentinel Web Server
//!
//! Binds the Axum app built by `create_app` and serves it.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main recon-sentinel web server
pub struct SentinelServer {
    config: WebConfig,
    state: AppState,
}

impl SentinelServer {
    /// Create a new server, building the application from configuration
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting Recon Sentinel web server");
        info!("Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state);

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }
}
