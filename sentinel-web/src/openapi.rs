//! OpenAPI specification for the Sentinel web server

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{
    ErrorResponse, FindingView, HealthResponse, InvestigationResponse, SearchRequest,
    SearchResponse, StartInvestigationRequest, StartInvestigationResponse, SuggestionsResponse,
    SummaryResponse,
};

/// Main OpenAPI specification for the Sentinel web server
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Recon Sentinel API",
        version = "0.1.0",
        description = "OSINT investigation workflow: query generation, searches, suggestions and profile summaries",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Health endpoints
        crate::handlers::health_check,

        // Investigation workflow
        crate::handlers::get_investigation,
        crate::handlers::start_investigation,
        crate::handlers::run_search,
        crate::handlers::request_suggestions,
        crate::handlers::request_summary,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            StartInvestigationRequest,
            StartInvestigationResponse,
            SearchRequest,
            SearchResponse,
            SuggestionsResponse,
            SummaryResponse,
            FindingView,
            InvestigationResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Investigation", description = "Investigation workflow operations"),
    )
)]
pub struct ApiDoc;

/// Get the OpenAPI specification as JSON
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Recon Sentinel API");
        assert_eq!(openapi.info.version, "0.1.0");
        assert!(openapi.paths.paths.contains_key("/api/investigation"));
        assert!(openapi.paths.paths.contains_key("/api/investigation/search"));
    }

    #[test]
    fn test_openapi_json() {
        let json = get_openapi_json().unwrap();
        assert!(json.contains("Recon Sentinel API"));
        assert!(json.contains("StartInvestigationRequest"));
    }
}
