// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Itinerary model: a user-owned plan around a location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Meters per kilometer; the API takes kilometers, storage is in meters.
pub const METERS_PER_KM: u32 = 1000;

/// Stored itinerary record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itinerary {
    /// Itinerary ID (also used as document ID)
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    pub title: String,
    /// Free-text location, geocoded when activities are generated
    pub location: String,
    /// Search radius in meters
    pub radius: u32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Itinerary {
    /// Build a new itinerary from a radius given in kilometers.
    pub fn new(
        user_id: Uuid,
        title: String,
        location: String,
        radius_km: u32,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            location,
            radius: radius_km.saturating_mul(METERS_PER_KM),
            notes: notes.filter(|n| !n.trim().is_empty()),
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}
