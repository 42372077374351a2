use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::intent::IntentResolver;
use crate::intent::classifier::ClassifierClient;
use crate::orchestrator::{PlacesCache, SearchOrchestrator};
use crate::places::PlacesClient;

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use self::middleware::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SearchOrchestrator>,
    pub config: Arc<Config>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wire every service once. Handlers only ever see shared references.
    pub fn from_config(config: Config) -> Result<AppState> {
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        let classifier = ClassifierClient::new(http.clone(), config.classifier.clone());
        let resolver = Arc::new(IntentResolver::new(classifier));
        let places = Arc::new(PlacesClient::new(http, config.google_maps.clone()));

        let mut orchestrator = SearchOrchestrator::new(resolver, places);
        if !config.cache.ttl.is_zero() {
            orchestrator = orchestrator.with_cache(Arc::new(PlacesCache::new(config.cache.ttl)));
        }

        let limiter = RateLimiter::new(
            config.security.rate_limit,
            config.security.rate_limit_window,
        );

        Ok(AppState {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
            limiter: Arc::new(limiter),
        })
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed = &config.security.allowed_origins;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(middleware::API_KEY_HEADER),
        ]);

    // credentials cannot be combined with a wildcard origin
    if allowed.iter().any(|origin| origin.trim() == "*") {
        log::warn!("CORS allows any origin, credentials disabled");
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router {
    let maps = Router::new()
        .route("/search", post(handlers::search_handler))
        .route("/directions", post(handlers::directions_handler))
        .route("/places/:place_id", get(handlers::place_details_handler))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ))
        .route_layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    let static_files = ServeDir::new(&state.config.server.static_dir)
        .not_found_service(handlers::not_found.into_service());

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/config", get(handlers::client_config_handler))
        .nest("/api/maps", maps)
        .with_state(state.clone())
        // Static file serving for the UI, JSON 404 for everything else
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(state.config.security.body_limit_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/health")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_wildcard_origin_allows_any_without_credentials() {
        let mut config = Config::default();
        config.security.allowed_origins = vec!["http://localhost:3001".to_string(), "*".to_string()];
        let router = create_router(AppState::from_config(config).unwrap());

        let response = router.oneshot(preflight("https://elsewhere.test")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_listed_origins_keep_credentials() {
        let mut config = Config::default();
        config.security.allowed_origins = vec![
            "http://localhost:3001".to_string(),
            "not a header\u{7f}".to_string(),
        ];
        let router = create_router(AppState::from_config(config).unwrap());

        let response = router
            .clone()
            .oneshot(preflight("http://localhost:3001"))
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3001"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

        let response = router
            .oneshot(preflight("https://elsewhere.test"))
            .await
            .unwrap();
        assert!(
            !response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }
}
