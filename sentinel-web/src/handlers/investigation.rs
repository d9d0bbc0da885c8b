//! Investigation handlers

use super::error::ApiError;
use super::types::{
    ErrorResponse, InvestigationResponse, SearchRequest, SearchResponse,
    StartInvestigationRequest, StartInvestigationResponse, SuggestionsResponse, SummaryResponse,
};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use sentinel_applications::SearchDispatch;
use tracing::info;

/// Get the current investigation
#[utoipa::path(
    get,
    path = "/api/investigation",
    tag = "Investigation",
    summary = "Current investigation",
    description = "Full state of the current investigation, including loading phase and findings",
    responses(
        (status = 200, description = "Investigation state", body = InvestigationResponse)
    )
)]
pub async fn get_investigation(State(state): State<AppState>) -> Json<InvestigationResponse> {
    Json(state.investigations().snapshot().await.into())
}

/// Start a new investigation
#[utoipa::path(
    post,
    path = "/api/investigation",
    tag = "Investigation",
    summary = "Start investigation",
    description = "Generate initial search queries for a subject and replace the current investigation",
    request_body = StartInvestigationRequest,
    responses(
        (status = 200, description = "Investigation started", body = StartInvestigationResponse),
        (status = 422, description = "Invalid subject", body = ErrorResponse),
        (status = 502, description = "Query generation failed", body = ErrorResponse)
    )
)]
pub async fn start_investigation(
    State(state): State<AppState>,
    Json(request): Json<StartInvestigationRequest>,
) -> Result<Json<StartInvestigationResponse>, ApiError> {
    info!(subject = %request.subject, "Investigation requested");

    let outcome = state
        .investigations()
        .start_investigation(&request.subject)
        .await?;
    Ok(Json(outcome.into()))
}

/// Run a search for one of the investigation's queries
#[utoipa::path(
    post,
    path = "/api/investigation/search",
    tag = "Investigation",
    summary = "Run search",
    description = "Search a query. With `wait` the finding is returned, otherwise the search runs in the background",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search finished or skipped", body = SearchResponse),
        (status = 202, description = "Search started", body = SearchResponse),
        (status = 404, description = "Query is not part of the investigation", body = ErrorResponse)
    )
)]
pub async fn run_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<(StatusCode, Json<SearchResponse>), ApiError> {
    let investigations = state.investigations();

    if request.wait.unwrap_or(false) {
        let outcome = investigations.run_search(&request.query).await?;
        return Ok((StatusCode::OK, Json(outcome.into())));
    }

    match investigations.spawn_search(&request.query).await? {
        SearchDispatch::Started(_) => Ok((StatusCode::ACCEPTED, Json(SearchResponse::started()))),
        SearchDispatch::Skipped(outcome) => Ok((StatusCode::OK, Json(outcome.into()))),
    }
}

/// Request new search terms
#[utoipa::path(
    post,
    path = "/api/investigation/suggestions",
    tag = "Investigation",
    summary = "Suggest queries",
    description = "Ask for new search terms based on the findings so far; new terms are appended to the queries",
    responses(
        (status = 200, description = "Suggestions merged", body = SuggestionsResponse),
        (status = 409, description = "Not enough findings", body = ErrorResponse),
        (status = 502, description = "Suggestion failed", body = ErrorResponse)
    )
)]
pub async fn request_suggestions(
    State(state): State<AppState>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let outcome = state.investigations().request_suggestions().await?;
    Ok(Json(outcome.into()))
}

/// Request a profile summary
#[utoipa::path(
    post,
    path = "/api/investigation/summary",
    tag = "Investigation",
    summary = "Summarize profile",
    description = "Summarize the findings so far into a profile of the subject",
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 409, description = "Not enough findings", body = ErrorResponse),
        (status = 502, description = "Summary failed", body = ErrorResponse)
    )
)]
pub async fn request_summary(
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state.investigations().request_summary().await?;
    Ok(Json(SummaryResponse { summary }))
}
