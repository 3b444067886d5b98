// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A place attached to an itinerary under one category keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Activity ID (also used as document ID)
    pub id: Uuid,
    /// Owning itinerary
    pub itinerary_id: Uuid,
    /// Owner, copied from the itinerary
    pub user_id: Uuid,
    /// Place name
    pub title: String,
    /// Category keyword the place was found under
    pub category: String,
    /// Canonical place URL from the details lookup
    pub activity_url: Option<String>,
    /// Vicinity address from the search result
    pub address: Option<String>,
    /// Editorial summary from the details lookup
    pub summary: Option<String>,
    /// When the generating request ran
    pub created_at: DateTime<Utc>,
    /// Index within the generating request (keeps category order)
    #[serde(default)]
    pub position: u32,
}

/// Sort activities in the order they were generated.
pub fn sort_by_creation(activities: &mut [Activity]) {
    activities.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.position.cmp(&b.position))
    });
}
