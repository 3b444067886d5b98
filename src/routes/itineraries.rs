// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Itinerary routes, including activity generation.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::owned_itinerary;
use crate::models::Itinerary;
use crate::routes::activities::ActivityResponse;
use crate::routes::validate_body;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Largest accepted search radius, in kilometers.
pub const MAX_RADIUS_KM: u32 = 50;
/// Longest accepted category keyword.
pub const MAX_CATEGORY_LEN: usize = 20;

pub const EMPTY_CATEGORIES: &str = "Please select at least one activity category.";
pub const ACTIVITIES_ADDED: &str = "Activities added successfully";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/itineraries",
            get(list_itineraries).post(create_itinerary),
        )
        .route(
            "/api/itineraries/{id}",
            get(get_itinerary).delete(delete_itinerary),
        )
        .route("/api/itineraries/{id}/activities", post(add_activities))
}

// ─── Itineraries ─────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateItineraryRequest {
    #[validate(length(min = 1, max = 100, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    pub location: String,
    #[validate(range(min = 1, max = 50, message = "Radius must be between 1 and 50 km"))]
    pub radius_km: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ItineraryResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: Uuid,
    pub title: String,
    pub location: String,
    /// Search radius in meters
    pub radius: u32,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<Itinerary> for ItineraryResponse {
    fn from(itinerary: Itinerary) -> Self {
        Self {
            id: itinerary.id,
            title: itinerary.title,
            location: itinerary.location,
            radius: itinerary.radius,
            notes: itinerary.notes,
            created_at: itinerary.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ItinerariesResponse {
    pub itineraries: Vec<ItineraryResponse>,
}

/// Itinerary with its activities in generation order.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ItineraryDetailResponse {
    pub itinerary: ItineraryResponse,
    pub activities: Vec<ActivityResponse>,
}

async fn list_itineraries(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ItinerariesResponse>> {
    let itineraries = state.db.list_itineraries_for_user(user.user_id).await?;

    Ok(Json(ItinerariesResponse {
        itineraries: itineraries.into_iter().map(Into::into).collect(),
    }))
}

async fn create_itinerary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateItineraryRequest>,
) -> Result<(StatusCode, Json<ItineraryResponse>)> {
    validate_body(&body)?;
    if body.title.trim().is_empty() || body.location.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Title and location are required".to_string(),
        ));
    }

    let itinerary = Itinerary::new(
        user.user_id,
        body.title.trim().to_string(),
        body.location.trim().to_string(),
        body.radius_km,
        body.notes,
    );

    state.db.create_itinerary(&itinerary).await?;

    tracing::info!(
        user_id = %user.user_id,
        itinerary_id = %itinerary.id,
        radius = itinerary.radius,
        "Itinerary created"
    );

    Ok((StatusCode::CREATED, Json(itinerary.into())))
}

async fn get_itinerary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItineraryDetailResponse>> {
    let itinerary = owned_itinerary(state.db.as_ref(), &user, id).await?;
    let activities = state.db.list_activities_for_itinerary(id).await?;

    Ok(Json(ItineraryDetailResponse {
        itinerary: itinerary.into(),
        activities: activities.into_iter().map(Into::into).collect(),
    }))
}

async fn delete_itinerary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    owned_itinerary(state.db.as_ref(), &user, id).await?;

    let deleted = state.db.delete_itinerary(id).await?;

    tracing::info!(user_id = %user.user_id, itinerary_id = %id, deleted, "Itinerary deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ─── Activity Generation ─────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddActivitiesRequest {
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AddActivitiesResponse {
    pub message: String,
    pub activities: Vec<ActivityResponse>,
}

/// Trim keywords and reject anything empty or too long.
fn normalize_categories(categories: Vec<String>) -> Result<Vec<String>> {
    if categories.is_empty() {
        return Err(AppError::BadRequest(EMPTY_CATEGORIES.to_string()));
    }

    categories
        .into_iter()
        .map(|c| {
            let c = c.trim().to_string();
            if c.is_empty() || c.chars().count() > MAX_CATEGORY_LEN {
                Err(AppError::BadRequest(format!(
                    "Category must be 1-{} characters",
                    MAX_CATEGORY_LEN
                )))
            } else {
                Ok(c)
            }
        })
        .collect()
}

/// Generate one activity per category and attach them to the itinerary.
///
/// Ownership and input are checked before any upstream call.
async fn add_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddActivitiesRequest>,
) -> Result<(StatusCode, Json<AddActivitiesResponse>)> {
    let itinerary = owned_itinerary(state.db.as_ref(), &user, id).await?;
    let categories = normalize_categories(body.categories)?;

    let activities = state.generator.generate(&itinerary, &categories).await?;

    Ok((
        StatusCode::CREATED,
        Json(AddActivitiesResponse {
            message: ACTIVITIES_ADDED.to_string(),
            activities: activities.into_iter().map(Into::into).collect(),
        }),
    ))
}
