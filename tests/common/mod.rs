// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use spontinerary::config::Config;
use spontinerary::db::{Database, FirestoreDb, MemoryDb};
use spontinerary::middleware::auth::create_jwt;
use spontinerary::models::{Itinerary, User};
use spontinerary::routes::create_router;
use spontinerary::services::{
    ActivityGenerator, Coordinates, PlaceDetails, PlaceSummary, PlacesApi, PlacesError,
};
use spontinerary::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Coordinates the fake geocoder answers with by default.
#[allow(dead_code)]
pub const CHICAGO: Coordinates = Coordinates {
    lat: 41.892654,
    lng: -87.610168,
};

/// Scripted `PlacesApi` that records how it was called.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakePlaces {
    /// Upstream status to fail geocoding with; `None` answers `CHICAGO`.
    pub geocode_failure: Option<String>,
    /// Candidates per keyword; unknown keywords get no results.
    pub results: HashMap<String, Vec<PlaceSummary>>,
    /// Details per place ID; unknown IDs get `None`.
    pub details: HashMap<String, PlaceDetails>,
    /// Keyword whose nearby search fails with HTTP 500.
    pub failing_search: Option<String>,
    /// Place ID whose details lookup fails with HTTP 500.
    pub failing_details: Option<String>,
    pub geocode_calls: AtomicUsize,
    pub searches: Mutex<Vec<(Coordinates, u32, String)>>,
}

#[allow(dead_code)]
impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_geocode(status: &str) -> Self {
        Self {
            geocode_failure: Some(status.to_string()),
            ..Self::default()
        }
    }

    pub fn with_failing_search(mut self, keyword: &str) -> Self {
        self.failing_search = Some(keyword.to_string());
        self
    }

    pub fn with_failing_details(mut self, place_id: &str) -> Self {
        self.failing_details = Some(place_id.to_string());
        self
    }

    /// Add candidates for a keyword.
    pub fn with_places(mut self, keyword: &str, places: &[(&str, &str, &str)]) -> Self {
        let summaries = places
            .iter()
            .map(|(id, name, vicinity)| PlaceSummary {
                id: id.to_string(),
                name: name.to_string(),
                vicinity: Some(vicinity.to_string()),
            })
            .collect();
        self.results.insert(keyword.to_string(), summaries);
        self
    }

    /// Add a details record for a place.
    pub fn with_details(mut self, place_id: &str, url: &str, overview: Option<&str>) -> Self {
        let details: PlaceDetails = serde_json::from_value(serde_json::json!({
            "url": url,
            "editorial_summary": overview.map(|o| serde_json::json!({ "overview": o })),
        }))
        .unwrap();
        self.details.insert(place_id.to_string(), details);
        self
    }

    pub fn geocode_calls(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn searched_keywords(&self) -> Vec<String> {
        self.searches
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, k)| k.clone())
            .collect()
    }
}

#[async_trait]
impl PlacesApi for FakePlaces {
    async fn geocode(&self, _address: &str) -> Result<Coordinates, PlacesError> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        match &self.geocode_failure {
            Some(status) => Err(PlacesError::Geocode(status.clone())),
            None => Ok(CHICAGO),
        }
    }

    async fn nearby_search(
        &self,
        location: Coordinates,
        radius_meters: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        self.searches
            .lock()
            .unwrap()
            .push((location, radius_meters, keyword.to_string()));
        if self.failing_search.as_deref() == Some(keyword) {
            return Err(PlacesError::Search { status: 500 });
        }
        Ok(self.results.get(keyword).cloned().unwrap_or_default())
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<PlaceDetails>, PlacesError> {
        if self.failing_details.as_deref() == Some(place_id) {
            return Err(PlacesError::Details { status: 500 });
        }
        Ok(self.details.get(place_id).cloned())
    }
}

/// Everything a route test needs to poke at.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: Arc<MemoryDb>,
    pub places: Arc<FakePlaces>,
}

/// Create a test app backed by `MemoryDb` and the given fake places.
#[allow(dead_code)]
pub fn create_test_app(places: FakePlaces) -> TestApp {
    let config = Config::test_default();
    let db = Arc::new(MemoryDb::new());
    let places = Arc::new(places);

    let generator = ActivityGenerator::with_seed(
        places.clone() as Arc<dyn PlacesApi>,
        db.clone() as Arc<dyn Database>,
        config.random_seed,
    );

    let state = Arc::new(AppState {
        config,
        db: db.clone(),
        generator,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        places,
    }
}

/// Store a user directly, bypassing signup.
#[allow(dead_code)]
pub async fn seed_user(db: &dyn Database, username: &str) -> User {
    let user = User::new(
        username.to_string(),
        format!("{}@example.com", username),
        "not-a-real-hash".to_string(),
        None,
    );
    db.create_user(&user).await.unwrap();
    user
}

/// Store an itinerary with a 5 km radius.
#[allow(dead_code)]
pub async fn seed_itinerary(db: &dyn Database, user: &User) -> Itinerary {
    let itinerary = Itinerary::new(
        user.id,
        "Weekend in Chicago".to_string(),
        "Chicago, IL".to_string(),
        5,
        None,
    );
    db.create_itinerary(&itinerary).await.unwrap();
    itinerary
}

/// Session token for `user_id` signed with the test config's key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: Uuid) -> String {
    create_jwt(user_id, &Config::test_default().jwt_signing_key).unwrap()
}

/// Authenticated JSON request.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Authenticated request without a body.
#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
