// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity generation service.
//!
//! Handles the core workflow for one request:
//! 1. Geocode the itinerary location (once per request)
//! 2. For each category: nearby search, random pick, details lookup
//! 3. Commit all resulting activities in a single transaction
//!
//! Categories are processed in order, one at a time. Any upstream error
//! aborts the request before anything is written.

use crate::db::Database;
use crate::error::Result;
use crate::models::{Activity, Itinerary};
use crate::services::places::PlacesApi;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Turns category keywords into persisted activities for an itinerary.
pub struct ActivityGenerator {
    places: Arc<dyn PlacesApi>,
    db: Arc<dyn Database>,
    rng: Mutex<StdRng>,
}

impl ActivityGenerator {
    pub fn new(places: Arc<dyn PlacesApi>, db: Arc<dyn Database>, rng: StdRng) -> Self {
        Self {
            places,
            db,
            rng: Mutex::new(rng),
        }
    }

    /// Build a generator seeded from `seed`, or from OS entropy when `None`.
    pub fn with_seed(
        places: Arc<dyn PlacesApi>,
        db: Arc<dyn Database>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(places, db, rng)
    }

    /// Generate activities for `categories` and commit them.
    ///
    /// Returns the committed activities in category order. Categories with
    /// no nearby places produce nothing.
    pub async fn generate(
        &self,
        itinerary: &Itinerary,
        categories: &[String],
    ) -> Result<Vec<Activity>> {
        let staged = self.stage(itinerary, categories).await?;

        self.db.commit_activities(&staged).await?;

        tracing::info!(
            itinerary_id = %itinerary.id,
            user_id = %itinerary.user_id,
            requested = categories.len(),
            created = staged.len(),
            "Activities generated"
        );

        Ok(staged)
    }

    /// Run the lookups and build activities without writing anything.
    pub async fn stage(
        &self,
        itinerary: &Itinerary,
        categories: &[String],
    ) -> Result<Vec<Activity>> {
        let location = self.places.geocode(&itinerary.location).await?;
        let created_at = Utc::now();
        let mut staged = Vec::with_capacity(categories.len());

        for category in categories {
            let candidates = self
                .places
                .nearby_search(location, itinerary.radius, category)
                .await?;

            tracing::debug!(
                itinerary_id = %itinerary.id,
                category = %category,
                candidates = candidates.len(),
                "Nearby search complete"
            );

            let Some(place) = self.pick(&candidates) else {
                continue;
            };

            let details = self.places.place_details(&place.id).await?;
            let (activity_url, summary) = match details {
                Some(d) => {
                    let summary = d.overview().map(str::to_string);
                    (d.url, summary)
                }
                None => (None, None),
            };

            staged.push(Activity {
                id: Uuid::new_v4(),
                itinerary_id: itinerary.id,
                user_id: itinerary.user_id,
                title: place.name,
                category: category.clone(),
                activity_url,
                address: place.vicinity,
                summary,
                created_at,
                position: staged.len() as u32,
            });
        }

        Ok(staged)
    }

    /// Uniform random choice over the candidates.
    fn pick<T: Clone>(&self, candidates: &[T]) -> Option<T> {
        // Poisoning leaves the RNG state intact.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        candidates.choose(&mut *rng).cloned()
    }
}
