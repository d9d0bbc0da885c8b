//! Route definitions for the Sentinel web server

use crate::{handlers, openapi, websocket, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Investigation workflow
        .route(
            "/investigation",
            get(handlers::get_investigation).post(handlers::start_investigation),
        )
        .route("/investigation/search", post(handlers::run_search))
        .route(
            "/investigation/suggestions",
            post(handlers::request_suggestions),
        )
        .route("/investigation/summary", post(handlers::request_summary))
        // API documentation
        .route("/openapi.json", get(openapi::openapi_json))
}

/// Create WebSocket routes
pub fn websocket_routes() -> Router<AppState> {
    Router::new().route("/events", get(websocket::events_handler))
}
