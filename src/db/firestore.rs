// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts)
//! - Itineraries (owned by users)
//! - Activities (owned by itineraries, denormalized owner)

use crate::db::{check_activity_references, collections, Database};
use crate::error::AppError;
use crate::models::activity::sort_by_creation;
use crate::models::{Activity, Itinerary, User};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Fetch every document of `collection` whose `field` equals `value`.
    async fn query_by_field<T>(
        &self,
        collection: &str,
        field: &'static str,
        value: String,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.for_all([q.field(field).eq(value.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete(&self, collection: &str, doc_ids: &[String]) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in doc_ids.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for doc_id in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    async fn delete_document(&self, collection: &str, doc_id: String) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(doc_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Database for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let (by_name, by_email) = futures_util::future::try_join(
            self.query_by_field::<User>(collections::USERS, "username", user.username.clone()),
            self.query_by_field::<User>(collections::USERS, "email", user.email.clone()),
        )
        .await?;

        if !by_name.is_empty() || !by_email.is_empty() {
            tracing::debug!(username = %user.username, "Rejected duplicate signup");
            return Err(AppError::Conflict("Invalid Inputs".to_string()));
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user.id.to_string())
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .query_by_field(collections::USERS, "username", username.to_string())
            .await?;
        Ok(users.into_iter().next())
    }

    /// Delete ALL data for a user.
    ///
    /// Deletes activities, then itineraries, then the user document.
    async fn delete_user(&self, user_id: Uuid) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        // 1. Activities (queried by owner, which covers every owned itinerary)
        let activities: Vec<Activity> = self
            .query_by_field(collections::ACTIVITIES, "user_id", user_id.to_string())
            .await?;
        let activity_ids: Vec<String> = activities.iter().map(|a| a.id.to_string()).collect();
        self.batch_delete(collections::ACTIVITIES, &activity_ids)
            .await?;
        deleted_count += activity_ids.len();
        tracing::debug!(%user_id, count = activity_ids.len(), "Deleted activities");

        // 2. Itineraries, plus any activity still pointing at them
        let itineraries: Vec<Itinerary> = self
            .query_by_field(collections::ITINERARIES, "user_id", user_id.to_string())
            .await?;
        let stragglers: Vec<Vec<Activity>> = try_join_all(itineraries.iter().map(|i| {
            self.query_by_field::<Activity>(
                collections::ACTIVITIES,
                "itinerary_id",
                i.id.to_string(),
            )
        }))
        .await?;
        let straggler_ids: Vec<String> = stragglers
            .into_iter()
            .flatten()
            .map(|a| a.id.to_string())
            .collect();
        self.batch_delete(collections::ACTIVITIES, &straggler_ids)
            .await?;
        deleted_count += straggler_ids.len();

        let itinerary_ids: Vec<String> = itineraries.iter().map(|i| i.id.to_string()).collect();
        self.batch_delete(collections::ITINERARIES, &itinerary_ids)
            .await?;
        deleted_count += itinerary_ids.len();
        tracing::debug!(%user_id, count = itinerary_ids.len(), "Deleted itineraries");

        // 3. User profile
        if self.get_user(user_id).await?.is_some() {
            self.delete_document(collections::USERS, user_id.to_string())
                .await?;
            deleted_count += 1;
        }

        tracing::info!(%user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }

    // ─── Itinerary Operations ────────────────────────────────────

    async fn create_itinerary(&self, itinerary: &Itinerary) -> Result<(), AppError> {
        if self.get_user(itinerary.user_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "User {} not found",
                itinerary.user_id
            )));
        }

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::ITINERARIES)
            .document_id(itinerary.id.to_string())
            .object(itinerary)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_itinerary(&self, itinerary_id: Uuid) -> Result<Option<Itinerary>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ITINERARIES)
            .obj()
            .one(&itinerary_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_itineraries_for_user(&self, user_id: Uuid) -> Result<Vec<Itinerary>, AppError> {
        let mut itineraries: Vec<Itinerary> = self
            .query_by_field(collections::ITINERARIES, "user_id", user_id.to_string())
            .await?;
        // Sorted here rather than in the query to avoid a composite index
        itineraries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(itineraries)
    }

    async fn delete_itinerary(&self, itinerary_id: Uuid) -> Result<usize, AppError> {
        let activities: Vec<Activity> = self
            .query_by_field(
                collections::ACTIVITIES,
                "itinerary_id",
                itinerary_id.to_string(),
            )
            .await?;

        let mut doc_ids: Vec<String> = activities.iter().map(|a| a.id.to_string()).collect();
        let activity_count = doc_ids.len();
        self.batch_delete(collections::ACTIVITIES, &doc_ids).await?;

        doc_ids.clear();
        if self.get_itinerary(itinerary_id).await?.is_some() {
            doc_ids.push(itinerary_id.to_string());
        }
        self.batch_delete(collections::ITINERARIES, &doc_ids).await?;

        let deleted = activity_count + doc_ids.len();
        tracing::debug!(%itinerary_id, deleted, "Deleted itinerary");
        Ok(deleted)
    }

    // ─── Activity Operations ─────────────────────────────────────

    async fn commit_activities(&self, activities: &[Activity]) -> Result<(), AppError> {
        if activities.is_empty() {
            return Ok(());
        }
        if activities.len() > BATCH_SIZE {
            return Err(AppError::BadRequest(format!(
                "Too many activities in one request (max {})",
                BATCH_SIZE
            )));
        }

        // Resolve every referenced itinerary and user before writing.
        // This mitigates "zombie data" if a deletion raced with generation.
        let itinerary_ids: HashSet<Uuid> = activities.iter().map(|a| a.itinerary_id).collect();
        let user_ids: HashSet<Uuid> = activities.iter().map(|a| a.user_id).collect();

        let mut owners: HashMap<Uuid, Uuid> = HashMap::new();
        for id in itinerary_ids {
            if let Some(itinerary) = self.get_itinerary(id).await? {
                owners.insert(id, itinerary.user_id);
            }
        }
        let mut users: HashSet<Uuid> = HashSet::new();
        for id in user_ids {
            if self.get_user(id).await?.is_some() {
                users.insert(id);
            }
        }

        check_activity_references(
            activities,
            |id| owners.get(&id).copied(),
            |id| users.contains(&id),
        )?;

        let client = self.get_client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for activity in activities {
            client
                .fluent()
                .update()
                .in_col(collections::ACTIVITIES)
                .document_id(activity.id.to_string())
                .object(activity)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add activity to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(count = activities.len(), "Activities committed atomically");
        Ok(())
    }

    async fn get_activity(&self, activity_id: Uuid) -> Result<Option<Activity>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ACTIVITIES)
            .obj()
            .one(&activity_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_activities_for_itinerary(
        &self,
        itinerary_id: Uuid,
    ) -> Result<Vec<Activity>, AppError> {
        let mut activities: Vec<Activity> = self
            .query_by_field(
                collections::ACTIVITIES,
                "itinerary_id",
                itinerary_id.to_string(),
            )
            .await?;
        sort_by_creation(&mut activities);
        Ok(activities)
    }

    async fn list_activities_for_user(&self, user_id: Uuid) -> Result<Vec<Activity>, AppError> {
        let mut activities: Vec<Activity> = self
            .query_by_field(collections::ACTIVITIES, "user_id", user_id.to_string())
            .await?;
        sort_by_creation(&mut activities);
        Ok(activities)
    }

    async fn delete_activity(&self, activity_id: Uuid) -> Result<(), AppError> {
        self.delete_document(collections::ACTIVITIES, activity_id.to_string())
            .await
    }
}
