//! Sentinel Web Server
//!
//! This module provides the investigation dashboard and its JSON API.

pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;
pub mod websocket;

// Re-export main types
pub use server::SentinelServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    Router::new()
        // Dashboard page
        .route("/", get(handlers::index_page))
        // API routes
        .nest("/api", routes::api_routes())
        // WebSocket routes
        .nest("/ws", routes::websocket_routes())
        .fallback(handlers::not_found)
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Sentinel configuration file (TOML)
    pub config_path: Option<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            config_path: None,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SENTINEL_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("SENTINEL_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(8080),
            dev_mode: std::env::var("SENTINEL_DEV_MODE")
                .ok()
                .and_then(|flag| flag.parse().ok())
                .unwrap_or(false),
            config_path: std::env::var("SENTINEL_CONFIG").ok(),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Application error: {0}")]
    Application(#[from] sentinel_applications::ApplicationError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
