// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process database backend.
//!
//! Tables are `DashMap`s so reads never block each other. Writes that touch
//! more than one record (batch commits, cascading deletes, uniqueness checks)
//! go through a single write gate so they are observed all-or-nothing.

use crate::db::{check_activity_references, Database};
use crate::error::AppError;
use crate::models::activity::sort_by_creation;
use crate::models::{Activity, Itinerary, User};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// In-memory database. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDb {
    users: Arc<DashMap<Uuid, User>>,
    itineraries: Arc<DashMap<Uuid, Itinerary>>,
    activities: Arc<DashMap<Uuid, Activity>>,
    write_gate: Arc<Mutex<()>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, AppError> {
        self.write_gate
            .lock()
            .map_err(|_| AppError::Database("Write lock poisoned".to_string()))
    }

    /// Remove every activity matching `pred`, returning how many were removed.
    fn remove_activities_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&Activity) -> bool,
    {
        let ids: Vec<Uuid> = self
            .activities
            .iter()
            .filter(|entry| pred(entry.value()))
            .map(|entry| *entry.key())
            .collect();

        ids.iter()
            .filter(|id| self.activities.remove(id).is_some())
            .count()
    }
}

#[async_trait]
impl Database for MemoryDb {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let _gate = self.lock_writes()?;

        let duplicate = self.users.iter().any(|entry| {
            let existing = entry.value();
            existing.username == user.username || existing.email == user.email
        });
        if duplicate {
            return Err(AppError::Conflict("Invalid Inputs".to_string()));
        }

        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&user_id).map(|u| u.value().clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().username == username)
            .map(|entry| entry.value().clone()))
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<usize, AppError> {
        let _gate = self.lock_writes()?;

        let mut deleted = self.remove_activities_where(|a| a.user_id == user_id);

        let itinerary_ids: Vec<Uuid> = self
            .itineraries
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| *entry.key())
            .collect();
        for id in &itinerary_ids {
            deleted += self.remove_activities_where(|a| a.itinerary_id == *id);
            if self.itineraries.remove(id).is_some() {
                deleted += 1;
            }
        }

        if self.users.remove(&user_id).is_some() {
            deleted += 1;
        }

        tracing::info!(%user_id, deleted, "User data deletion complete");
        Ok(deleted)
    }

    async fn create_itinerary(&self, itinerary: &Itinerary) -> Result<(), AppError> {
        let _gate = self.lock_writes()?;

        if !self.users.contains_key(&itinerary.user_id) {
            return Err(AppError::NotFound(format!(
                "User {} not found",
                itinerary.user_id
            )));
        }

        self.itineraries.insert(itinerary.id, itinerary.clone());
        Ok(())
    }

    async fn get_itinerary(&self, itinerary_id: Uuid) -> Result<Option<Itinerary>, AppError> {
        Ok(self.itineraries.get(&itinerary_id).map(|i| i.value().clone()))
    }

    async fn list_itineraries_for_user(&self, user_id: Uuid) -> Result<Vec<Itinerary>, AppError> {
        let mut itineraries: Vec<Itinerary> = self
            .itineraries
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        itineraries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(itineraries)
    }

    async fn delete_itinerary(&self, itinerary_id: Uuid) -> Result<usize, AppError> {
        let _gate = self.lock_writes()?;

        let mut deleted = self.remove_activities_where(|a| a.itinerary_id == itinerary_id);
        if self.itineraries.remove(&itinerary_id).is_some() {
            deleted += 1;
        }

        tracing::debug!(%itinerary_id, deleted, "Deleted itinerary");
        Ok(deleted)
    }

    async fn commit_activities(&self, activities: &[Activity]) -> Result<(), AppError> {
        if activities.is_empty() {
            return Ok(());
        }

        let _gate = self.lock_writes()?;

        check_activity_references(
            activities,
            |id| self.itineraries.get(&id).map(|i| i.user_id),
            |id| self.users.contains_key(&id),
        )?;

        for activity in activities {
            self.activities.insert(activity.id, activity.clone());
        }

        tracing::debug!(count = activities.len(), "Committed activities");
        Ok(())
    }

    async fn get_activity(&self, activity_id: Uuid) -> Result<Option<Activity>, AppError> {
        Ok(self.activities.get(&activity_id).map(|a| a.value().clone()))
    }

    async fn list_activities_for_itinerary(
        &self,
        itinerary_id: Uuid,
    ) -> Result<Vec<Activity>, AppError> {
        let mut activities: Vec<Activity> = self
            .activities
            .iter()
            .filter(|entry| entry.value().itinerary_id == itinerary_id)
            .map(|entry| entry.value().clone())
            .collect();
        sort_by_creation(&mut activities);
        Ok(activities)
    }

    async fn list_activities_for_user(&self, user_id: Uuid) -> Result<Vec<Activity>, AppError> {
        let mut activities: Vec<Activity> = self
            .activities
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        sort_by_creation(&mut activities);
        Ok(activities)
    }

    async fn delete_activity(&self, activity_id: Uuid) -> Result<(), AppError> {
        self.activities.remove(&activity_id);
        Ok(())
    }
}
