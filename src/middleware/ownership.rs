// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ownership guards for itinerary and activity handlers.
//!
//! Handlers call these first thing; the guard loads the record and either
//! hands it back or fails before any side effect happens.

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, Itinerary};
use uuid::Uuid;

pub const ITINERARY_FORBIDDEN: &str =
    "Access unauthorized. You cannot add to another user's itinerary.";
pub const ACTIVITY_FORBIDDEN: &str =
    "Access unauthorized. You cannot modify another user's activity.";

/// Load an itinerary the caller owns.
///
/// Missing itineraries are 404, someone else's are 403.
pub async fn owned_itinerary(
    db: &dyn Database,
    user: &AuthUser,
    itinerary_id: Uuid,
) -> Result<Itinerary> {
    let itinerary = db
        .get_itinerary(itinerary_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Itinerary {} not found", itinerary_id)))?;

    if !itinerary.is_owned_by(user.user_id) {
        tracing::warn!(
            user_id = %user.user_id,
            %itinerary_id,
            "Blocked access to another user's itinerary"
        );
        return Err(AppError::Forbidden(ITINERARY_FORBIDDEN.to_string()));
    }

    Ok(itinerary)
}

/// Load an activity the caller owns.
pub async fn owned_activity(
    db: &dyn Database,
    user: &AuthUser,
    activity_id: Uuid,
) -> Result<Activity> {
    let activity = db
        .get_activity(activity_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Activity {} not found", activity_id)))?;

    if activity.user_id != user.user_id {
        tracing::warn!(
            user_id = %user.user_id,
            %activity_id,
            "Blocked access to another user's activity"
        );
        return Err(AppError::Forbidden(ACTIVITY_FORBIDDEN.to_string()));
    }

    Ok(activity)
}
