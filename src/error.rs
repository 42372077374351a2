use thiserror::Error;

/// Client-caused input failure. Always maps to a 400.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures talking to the place-search provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key rejected: {0}")]
    Auth(String),

    #[error("Google Maps API quota exceeded")]
    QuotaExceeded,

    #[error("Google Places API error: {status} - {message}")]
    Status { status: String, message: String },

    #[error("request to places provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Generic failure of the auxiliary details/directions calls.
    #[error("failed to get {operation}: {detail}")]
    Request {
        operation: &'static str,
        detail: String,
    },
}

/// Reasons the classifier reply could not be turned into an intent.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no JSON object found in classifier reply")]
    NoJsonObject,

    #[error("classifier reply is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("classifier reply does not match a known intent: {0}")]
    UnrecognizedIntent(#[source] serde_json::Error),
}

/// Never surfaced to callers; every variant triggers the keyword fallback.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier is unavailable")]
    Unavailable,

    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Failed to search places: {0}")]
    Provider(#[from] ProviderError),
}
