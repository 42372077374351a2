use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data_models::{Intent, Place, SearchMetadata};

/// Fields are kept as raw JSON so type errors surface as validation errors
/// rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    pub query: Option<Value>,
    pub location: Option<Value>,
    pub radius: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DirectionsRequest {
    pub origin: Option<Value>,
    pub destination: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub llm_analysis: Intent,
    pub places: Vec<Place>,
    pub search_metadata: SearchMetadata,
}

#[derive(Debug, Serialize)]
pub struct DirectionsResponse {
    pub success: bool,
    pub directions: Value,
}

#[derive(Debug, Serialize)]
pub struct PlaceDetailsResponse {
    pub success: bool,
    pub place: Value,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigResponse {
    pub google_maps_client_key: Option<String>,
}
