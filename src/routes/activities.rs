// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity listing and deletion.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::middleware::ownership::owned_activity;
use crate::models::Activity;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities))
        .route("/api/activities/{id}", delete(delete_activity))
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: Uuid,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub itinerary_id: Uuid,
    pub title: String,
    pub category: String,
    pub activity_url: Option<String>,
    pub address: Option<String>,
    pub summary: Option<String>,
    pub created_at: String,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            itinerary_id: activity.itinerary_id,
            title: activity.title,
            category: activity.category,
            activity_url: activity.activity_url,
            address: activity.address,
            summary: activity.summary,
            created_at: activity.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityResponse>,
}

/// All of the caller's activities across itineraries.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ActivitiesResponse>> {
    let activities = state.db.list_activities_for_user(user.user_id).await?;

    Ok(Json(ActivitiesResponse {
        activities: activities.into_iter().map(Into::into).collect(),
    }))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    owned_activity(state.db.as_ref(), &user, id).await?;
    state.db.delete_activity(id).await?;

    tracing::info!(user_id = %user.user_id, activity_id = %id, "Activity deleted");

    Ok(StatusCode::NO_CONTENT)
}
