// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Maps client for geocoding and place lookups.
//!
//! Handles:
//! - Geocoding a free-text address to coordinates
//! - Nearby search around coordinates for a keyword
//! - Place details (canonical URL, editorial summary)
//!
//! The generator only sees the `PlacesApi` trait, so tests can swap in a
//! scripted implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Google's "everything is fine" status.
const STATUS_OK: &str = "OK";
/// Google's "valid request, nothing matched" status.
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
/// Fields requested from the details endpoint.
const DETAIL_FIELDS: &str = "url,editorial_summary";

/// Errors from the Google Maps web services.
#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    /// Geocoding failed: non-OK upstream status or a transport failure.
    #[error("Error getting geocode: {0}")]
    Geocode(String),

    /// Nearby search returned a non-success HTTP status.
    #[error("Places search failed with HTTP status {status}")]
    Search { status: u16 },

    /// Nearby search returned an error status in its body.
    #[error("Places search failed: {0}")]
    SearchStatus(String),

    /// Place details returned a non-success HTTP status.
    #[error("Place details failed with HTTP status {status}")]
    Details { status: u16 },

    /// Network error or unreadable body outside of geocoding.
    #[error("Places request failed: {0}")]
    Transport(String),
}

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A candidate place from nearby search.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaceSummary {
    #[serde(rename = "place_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
}

/// Extended details for a single place.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub editorial_summary: Option<EditorialSummary>,
}

impl PlaceDetails {
    /// Editorial overview text, if Google has one.
    pub fn overview(&self) -> Option<&str> {
        self.editorial_summary
            .as_ref()
            .and_then(|s| s.overview.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EditorialSummary {
    #[serde(default)]
    pub overview: Option<String>,
}

/// Geocoding, nearby search and place details.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// Resolve an address to coordinates. Only the first result is used.
    async fn geocode(&self, address: &str) -> Result<Coordinates, PlacesError>;

    /// Places within `radius_meters` of `location` matching `keyword`.
    ///
    /// An empty list is a valid answer.
    async fn nearby_search(
        &self,
        location: Coordinates,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceSummary>, PlacesError>;

    /// Details for one place; `None` when Google has no record.
    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError>;
}

// ─── Wire formats ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceSummary>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    #[serde(default)]
    result: Option<PlaceDetails>,
}

fn coordinates_from_response(response: GeocodeResponse) -> Result<Coordinates, PlacesError> {
    if response.status != STATUS_OK {
        return Err(PlacesError::Geocode(response.status));
    }

    response
        .results
        .into_iter()
        .next()
        .map(|r| r.geometry.location)
        .ok_or_else(|| PlacesError::Geocode(STATUS_ZERO_RESULTS.to_string()))
}

fn places_from_response(response: NearbySearchResponse) -> Result<Vec<PlaceSummary>, PlacesError> {
    match response.status.as_str() {
        STATUS_OK => Ok(response.results),
        STATUS_ZERO_RESULTS => Ok(Vec::new()),
        other => Err(PlacesError::SearchStatus(other.to_string())),
    }
}

// ─── Google client ────────────────────────────────────────────────────────

/// Google Maps web services client.
#[derive(Clone)]
pub struct GooglePlacesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    /// Create a client against `base_url` (normally `https://maps.googleapis.com/maps/api`).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl PlacesApi for GooglePlacesClient {
    async fn geocode(&self, address: &str) -> Result<Coordinates, PlacesError> {
        let url = format!("{}/geocode/json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| PlacesError::Geocode(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!(status = %status, "Geocoding request failed");
            return Err(PlacesError::Geocode(format!("HTTP {}", status.as_u16())));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::Geocode(format!("JSON parse error: {}", e)))?;

        let coordinates = coordinates_from_response(body)?;
        tracing::debug!(address, lat = coordinates.lat, lng = coordinates.lng, "Geocoded");
        Ok(coordinates)
    }

    async fn nearby_search(
        &self,
        location: Coordinates,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        let url = format!("{}/place/nearbysearch/json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("location", format!("{},{}", location.lat, location.lng)),
                ("radius", radius_meters.to_string()),
                ("keyword", keyword.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| PlacesError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::warn!(status, keyword, "Places search failed");
            return Err(PlacesError::Search { status });
        }

        let body: NearbySearchResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::Transport(format!("JSON parse error: {}", e)))?;

        places_from_response(body)
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        let url = format!("{}/place/details/json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PlacesError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::warn!(status, place_id, "Place details failed");
            return Err(PlacesError::Details { status });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlacesError::Transport(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let parsed: PlaceDetailsResponse = serde_json::from_str(&body)
            .map_err(|e| PlacesError::Transport(format!("JSON parse error: {}", e)))?;
        Ok(parsed.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn geocode(value: serde_json::Value) -> Result<Coordinates, PlacesError> {
        coordinates_from_response(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_geocode_ok_returns_first_result() {
        let coords = geocode(json!({
            "status": "OK",
            "results": [
                { "geometry": { "location": { "lat": 41.892654, "lng": -87.610168 } } },
                { "geometry": { "location": { "lat": 1.0, "lng": 2.0 } } }
            ]
        }))
        .unwrap();

        assert_eq!(coords.lat, 41.892654);
        assert_eq!(coords.lng, -87.610168);
    }

    #[test]
    fn test_geocode_zero_results_is_error() {
        let err = geocode(json!({ "status": "ZERO_RESULTS", "results": [] })).unwrap_err();
        assert!(matches!(err, PlacesError::Geocode(_)));
        assert_eq!(err.to_string(), "Error getting geocode: ZERO_RESULTS");
    }

    #[test]
    fn test_geocode_ok_without_results_is_error() {
        let err = geocode(json!({ "status": "OK", "results": [] })).unwrap_err();
        assert!(err.to_string().contains("ZERO_RESULTS"));
    }

    #[test]
    fn test_geocode_denied_carries_status() {
        let err = geocode(json!({ "status": "REQUEST_DENIED" })).unwrap_err();
        assert!(err.to_string().contains("REQUEST_DENIED"));
    }

    #[test]
    fn test_nearby_search_statuses() {
        let ok: NearbySearchResponse = serde_json::from_value(json!({
            "status": "OK",
            "results": [
                { "place_id": "abc", "name": "Portillo's", "vicinity": "520 W Taylor St" },
                { "place_id": "def", "name": "Navy Pier" }
            ]
        }))
        .unwrap();
        let places = places_from_response(ok).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].id, "abc");
        assert_eq!(places[0].vicinity.as_deref(), Some("520 W Taylor St"));
        assert_eq!(places[1].vicinity, None);

        let empty: NearbySearchResponse =
            serde_json::from_value(json!({ "status": "ZERO_RESULTS", "results": [] })).unwrap();
        assert!(places_from_response(empty).unwrap().is_empty());

        let denied: NearbySearchResponse =
            serde_json::from_value(json!({ "status": "OVER_QUERY_LIMIT" })).unwrap();
        assert!(matches!(
            places_from_response(denied),
            Err(PlacesError::SearchStatus(s)) if s == "OVER_QUERY_LIMIT"
        ));
    }

    #[test]
    fn test_place_details_overview() {
        let full: PlaceDetailsResponse = serde_json::from_value(json!({
            "status": "OK",
            "result": {
                "url": "https://maps.google.com/?cid=1",
                "editorial_summary": { "overview": "Iconic lakefront pier." }
            }
        }))
        .unwrap();
        let details = full.result.unwrap();
        assert_eq!(details.url.as_deref(), Some("https://maps.google.com/?cid=1"));
        assert_eq!(details.overview(), Some("Iconic lakefront pier."));

        let bare: PlaceDetailsResponse =
            serde_json::from_value(json!({ "status": "NOT_FOUND" })).unwrap();
        assert!(bare.result.is_none());
    }
}
