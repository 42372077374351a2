use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::GoogleMapsConfig;
use crate::data_models::{LatLng, Place};
use crate::error::ProviderError;

pub const DEFAULT_ZOOM: u8 = 15;
pub const DEFAULT_STATIC_WIDTH: u32 = 400;
pub const DEFAULT_STATIC_HEIGHT: u32 = 300;
const DETAIL_FIELDS: &str = "name,formatted_address,geometry,rating,opening_hours,photos,website";

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawPlace>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    place_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    formatted_address: String,
    rating: Option<f64>,
    user_ratings_total: Option<u64>,
    geometry: RawGeometry,
    #[serde(default)]
    types: Vec<String>,
    opening_hours: Option<RawOpeningHours>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct RawOpeningHours {
    open_now: Option<bool>,
}

/// Client for the Google Places text search plus the auxiliary details and
/// directions endpoints.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    http: Client,
    config: GoogleMapsConfig,
}

impl PlacesClient {
    pub fn new(http: Client, config: GoogleMapsConfig) -> Self {
        Self { http, config }
    }

    pub fn max_results(&self) -> usize {
        self.config.max_results
    }

    /// Key that ends up in URLs the browser loads.
    fn browser_key(&self) -> &str {
        self.config
            .client_key
            .as_deref()
            .unwrap_or(&self.config.api_key)
    }

    pub async fn search(
        &self,
        refined_query: &str,
        location: Option<&str>,
        radius: Option<u32>,
    ) -> Result<Vec<Place>, ProviderError> {
        let search_query = match location {
            Some(location) => format!("{refined_query} in {location}"),
            None => refined_query.to_string(),
        };

        let mut params = vec![
            ("query", search_query.clone()),
            ("key", self.config.api_key.clone()),
        ];
        if let Some(radius) = radius {
            params.push(("radius", radius.to_string()));
        }

        log::info!(
            "searching places, query: {search_query:?}, has_location: {}, has_radius: {}",
            location.is_some(),
            radius.is_some()
        );

        let res: TextSearchResponse = self
            .http
            .get(&self.config.places_endpoint)
            .query(&params)
            .timeout(self.config.request_timeout)
            .send()
            .await?
            .json()
            .await?;

        log::info!("places provider status: {}", res.status);
        let message = res.error_message.unwrap_or_default();

        match res.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => {
                log::info!("no results found for query: {search_query:?}");
                return Ok(Vec::new());
            }
            "REQUEST_DENIED" => return Err(ProviderError::Auth(message)),
            "OVER_QUERY_LIMIT" => return Err(ProviderError::QuotaExceeded),
            _ => {
                return Err(ProviderError::Status {
                    status: res.status,
                    message,
                });
            }
        }

        let places = res
            .results
            .into_iter()
            .take(self.config.max_results)
            .map(|raw| self.to_place(raw))
            .collect();
        Ok(places)
    }

    fn to_place(&self, raw: RawPlace) -> Place {
        let location = raw.geometry.location;
        Place {
            maps_url: maps_url(location.lat, location.lng, &raw.name),
            embed_url: self.embed_url(location.lat, location.lng, DEFAULT_ZOOM),
            id: raw.place_id,
            name: raw.name,
            address: raw.formatted_address,
            rating: raw.rating,
            total_ratings: raw.user_ratings_total,
            location,
            types: raw.types,
            open_now: raw.opening_hours.and_then(|h| h.open_now),
        }
    }

    pub fn embed_url(&self, lat: f64, lng: f64, zoom: u8) -> String {
        embed_url(self.browser_key(), lat, lng, zoom)
    }

    pub fn static_map_url(&self, lat: f64, lng: f64, zoom: u8, width: u32, height: u32) -> String {
        static_map_url(self.browser_key(), lat, lng, zoom, width, height)
    }

    /// Raw `result` object of the place details endpoint.
    pub async fn details(&self, place_id: &str) -> Result<Value, ProviderError> {
        let payload = self
            .get_json(
                "place details",
                &self.config.details_endpoint,
                &[
                    ("place_id", place_id),
                    ("fields", DETAIL_FIELDS),
                    ("key", self.config.api_key.as_str()),
                ],
            )
            .await?;
        Ok(payload.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Whole directions payload, routes and all.
    pub async fn directions(&self, origin: &str, destination: &str) -> Result<Value, ProviderError> {
        self.get_json(
            "directions",
            &self.config.directions_endpoint,
            &[
                ("origin", origin),
                ("destination", destination),
                ("key", self.config.api_key.as_str()),
            ],
        )
        .await
    }

    async fn get_json(
        &self,
        operation: &'static str,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, ProviderError> {
        let fail = |detail: String| {
            log::error!("error getting {operation}: {detail}");
            ProviderError::Request { operation, detail }
        };

        let res = self
            .http
            .get(endpoint)
            .query(params)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| fail(format!("{:#}", e)))?;

        if !res.status().is_success() {
            return Err(fail(format!("HTTP {}", res.status())));
        }

        let payload: Value = res.json().await.map_err(|e| fail(format!("{:#}", e)))?;
        match payload.get("status").and_then(Value::as_str) {
            Some("OK") | None => Ok(payload),
            Some(status) => Err(fail(format!("provider status {status}"))),
        }
    }
}

/// Deep link into Google Maps for a place.
pub fn maps_url(lat: f64, lng: f64, place_name: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={lat},{lng}&query_place_id={}",
        urlencoding::encode(place_name)
    )
}

pub fn embed_url(key: &str, lat: f64, lng: f64, zoom: u8) -> String {
    format!(
        "https://www.google.com/maps/embed/v1/view?key={}&center={lat},{lng}&zoom={zoom}",
        urlencoding::encode(key)
    )
}

/// Static image rendering, for clients that cannot host an embedded map.
pub fn static_map_url(key: &str, lat: f64, lng: f64, zoom: u8, width: u32, height: u32) -> String {
    format!(
        "https://maps.googleapis.com/maps/api/staticmap?center={lat},{lng}&zoom={zoom}&size={width}x{height}&markers=color:red%7C{lat},{lng}&key={}",
        urlencoding::encode(key)
    )
}
