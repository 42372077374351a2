use std::sync::Arc;

use serde_json::Value;

use crate::cache::ResponseCache;
use crate::data_models::{Intent, Place, SearchResult};
use crate::error::{ProviderError, SearchError};
use crate::intent::IntentResolver;
use crate::places::PlacesClient;
use crate::validation;

/// Outbound search parameters, used as the place cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub query: String,
    pub location: Option<String>,
    pub radius: Option<u32>,
}

pub type PlacesCache = ResponseCache<SearchKey, Vec<Place>>;

/// Top-level coordinator: validate, resolve the intent, search when the
/// intent asks for places, and assemble the result.
pub struct SearchOrchestrator {
    resolver: Arc<IntentResolver>,
    places: Arc<PlacesClient>,
    cache: Option<Arc<PlacesCache>>,
}

impl SearchOrchestrator {
    pub fn new(resolver: Arc<IntentResolver>, places: Arc<PlacesClient>) -> Self {
        Self {
            resolver,
            places,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<PlacesCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<PlacesCache>> {
        self.cache.as_ref()
    }

    pub async fn handle_search(
        &self,
        query: Option<&str>,
        location: Option<&str>,
        radius: Option<i64>,
    ) -> Result<SearchResult, SearchError> {
        let query = validation::validate_query(query)?;
        let location = validation::validate_location(location)?;
        let radius = validation::validate_radius(radius)?;

        let intent = self.resolver.resolve(&query).await;

        let places = match &intent {
            Intent::SearchPlaces {
                location: intent_location,
                refined_query,
                ..
            } => {
                let search_location = location
                    .clone()
                    .or_else(|| intent_location.clone().filter(|l| !l.trim().is_empty()));
                let key = SearchKey {
                    query: refined_query.clone(),
                    location: search_location,
                    radius,
                };
                self.search_places(key).await.map_err(|e| {
                    log::error!("place search failed: {:#}", e);
                    e
                })?
            }
            Intent::General { .. } => Vec::new(),
        };

        Ok(SearchResult::new(intent, places, query, location, radius))
    }

    async fn search_places(&self, key: SearchKey) -> Result<Vec<Place>, ProviderError> {
        if let Some(cache) = &self.cache {
            if let Some(places) = cache.get(&key) {
                log::debug!("place search served from cache: {:?}", key.query);
                return Ok(places);
            }
        }

        let places = self
            .places
            .search(&key.query, key.location.as_deref(), key.radius)
            .await?;

        if let Some(cache) = &self.cache {
            cache.set(key, places.clone());
        }
        Ok(places)
    }

    pub async fn handle_directions(
        &self,
        origin: Option<&str>,
        destination: Option<&str>,
    ) -> Result<Value, SearchError> {
        let (origin, destination) = validation::validate_origin_destination(origin, destination)?;
        Ok(self.places.directions(&origin, &destination).await?)
    }

    pub async fn handle_place_details(&self, place_id: Option<&str>) -> Result<Value, SearchError> {
        let place_id = validation::validate_place_id(place_id)?;
        Ok(self.places.details(&place_id).await?)
    }
}

