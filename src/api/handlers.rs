use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::Uri;
use nanoid::nanoid;
use std::time::Instant;

use crate::error::ValidationError;
use crate::validation;

use super::AppState;
use super::error::ApiError;
use super::models::{
    ClientConfigResponse, DirectionsRequest, DirectionsResponse, HealthResponse,
    PlaceDetailsResponse, SearchRequest, SearchResponse,
};

fn body_or_error<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::Validation(ValidationError::new("body", e.body_text())))
}

pub async fn search_handler(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = Instant::now();
    let request_id = nanoid!(10);
    let request = body_or_error(payload)?;

    let query = validation::text_field("query", request.query.as_ref())?;
    let location = validation::text_field("location", request.location.as_ref())?;
    let radius = validation::radius_field(request.radius.as_ref())?;

    log::info!("[{request_id}] search request received");

    let result = state
        .orchestrator
        .handle_search(query, location, radius)
        .await
        .map_err(|e| {
            ApiError::from_search(
                "Failed to search for places",
                e,
                state.config.is_development(),
            )
        })?;

    log::info!(
        "[{request_id}] search finished with {} places in {}ms",
        result.metadata.result_count,
        start.elapsed().as_millis()
    );

    Ok(Json(SearchResponse {
        success: true,
        llm_analysis: result.intent,
        places: result.places,
        search_metadata: result.metadata,
    }))
}

pub async fn directions_handler(
    State(state): State<AppState>,
    payload: Result<Json<DirectionsRequest>, JsonRejection>,
) -> Result<Json<DirectionsResponse>, ApiError> {
    let request = body_or_error(payload)?;
    let origin = validation::text_field("origin", request.origin.as_ref())?;
    let destination = validation::text_field("destination", request.destination.as_ref())?;

    let directions = state
        .orchestrator
        .handle_directions(origin, destination)
        .await
        .map_err(|e| ApiError::from_search("Failed to get directions", e, false))?;

    Ok(Json(DirectionsResponse {
        success: true,
        directions,
    }))
}

pub async fn place_details_handler(
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> Result<Json<PlaceDetailsResponse>, ApiError> {
    let place = state
        .orchestrator
        .handle_place_details(Some(place_id.as_str()))
        .await
        .map_err(|e| ApiError::from_search("Failed to get place details", e, false))?;

    Ok(Json(PlaceDetailsResponse {
        success: true,
        place,
    }))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: "wayfinder",
    })
}

pub async fn client_config_handler(State(state): State<AppState>) -> Json<ClientConfigResponse> {
    Json(ClientConfigResponse {
        google_maps_client_key: state.config.google_maps.client_key.clone(),
    })
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
