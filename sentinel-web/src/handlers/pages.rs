//! Page handlers

use super::error::ApiError;
use crate::{templates::IndexTemplate, AppState};
use askama::Template;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::Html,
};
use tracing::error;

/// Dashboard page
pub async fn index_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let template = IndexTemplate::new(
        state.config.dev_mode,
        state.application.model_info().map(|model| model.summary()),
        state.investigations().config().subject_max_len,
    );

    template.render().map(Html).map_err(|e| {
        error!(error = %e, "Failed to render dashboard");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page")
    })
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
