// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spontinerary API Server
//!
//! Builds itineraries around a location and fills them with randomly
//! chosen nearby places from Google Maps, one per requested category.

use spontinerary::{
    config::{Config, DatabaseBackend},
    db::{Database, FirestoreDb, MemoryDb},
    services::{ActivityGenerator, GooglePlacesClient, PlacesApi},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Spontinerary API");

    let db: Arc<dyn Database> = match config.database_backend {
        DatabaseBackend::Firestore => Arc::new(
            FirestoreDb::new(&config.gcp_project_id)
                .await
                .expect("Failed to connect to Firestore"),
        ),
        DatabaseBackend::Memory => {
            tracing::warn!("Using in-memory database; data is lost on restart");
            Arc::new(MemoryDb::new())
        }
    };

    let places: Arc<dyn PlacesApi> = Arc::new(GooglePlacesClient::new(
        config.google_maps_base_url.clone(),
        config.google_maps_api_key.clone(),
    ));
    tracing::info!(base_url = %config.google_maps_base_url, "Google Maps client initialized");

    if config.random_seed.is_some() {
        tracing::info!("Activity picker seeded from RANDOM_SEED");
    }
    let generator = ActivityGenerator::with_seed(places, db.clone(), config.random_seed);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        generator,
    });

    // Build router
    let app = spontinerary::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spontinerary=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
