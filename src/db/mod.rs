//! Database layer.
//!
//! Handlers and services talk to `dyn Database`; the concrete backend is
//! chosen at startup (`FirestoreDb` in production, `MemoryDb` for local
//! runs and tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Activity, Itinerary, User};
use async_trait::async_trait;
use uuid::Uuid;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ITINERARIES: &str = "itineraries";
    pub const ACTIVITIES: &str = "activities";
}

/// Persistence operations over users, itineraries and activities.
///
/// Deletes cascade: removing a user removes their itineraries and
/// activities, removing an itinerary removes its activities.
#[async_trait]
pub trait Database: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    /// Store a new user. Fails with `Conflict` if the username or email is taken.
    async fn create_user(&self, user: &User) -> Result<(), AppError>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Delete a user with all their itineraries and activities.
    ///
    /// Returns the number of records removed.
    async fn delete_user(&self, user_id: Uuid) -> Result<usize, AppError>;

    // ─── Itineraries ─────────────────────────────────────────────

    /// Store a new itinerary. The owning user must exist.
    async fn create_itinerary(&self, itinerary: &Itinerary) -> Result<(), AppError>;

    async fn get_itinerary(&self, itinerary_id: Uuid) -> Result<Option<Itinerary>, AppError>;

    /// Itineraries owned by a user, newest first.
    async fn list_itineraries_for_user(&self, user_id: Uuid) -> Result<Vec<Itinerary>, AppError>;

    /// Delete an itinerary and its activities. Returns the number of records removed.
    async fn delete_itinerary(&self, itinerary_id: Uuid) -> Result<usize, AppError>;

    // ─── Activities ──────────────────────────────────────────────

    /// Commit a batch of activities atomically.
    ///
    /// Every activity must reference an existing itinerary and user, and
    /// its user must own the itinerary. On any violation nothing is written.
    async fn commit_activities(&self, activities: &[Activity]) -> Result<(), AppError>;

    async fn get_activity(&self, activity_id: Uuid) -> Result<Option<Activity>, AppError>;

    /// Activities of one itinerary in generation order.
    async fn list_activities_for_itinerary(
        &self,
        itinerary_id: Uuid,
    ) -> Result<Vec<Activity>, AppError>;

    /// All activities of a user in generation order.
    async fn list_activities_for_user(&self, user_id: Uuid) -> Result<Vec<Activity>, AppError>;

    async fn delete_activity(&self, activity_id: Uuid) -> Result<(), AppError>;
}

/// Referential checks shared by both backends for `commit_activities`.
///
/// `lookup` resolves an itinerary ID to its owner if the itinerary exists,
/// `user_exists` reports whether a user exists.
pub(crate) fn check_activity_references<L, U>(
    activities: &[Activity],
    mut lookup: L,
    mut user_exists: U,
) -> Result<(), AppError>
where
    L: FnMut(Uuid) -> Option<Uuid>,
    U: FnMut(Uuid) -> bool,
{
    for activity in activities {
        let owner = lookup(activity.itinerary_id).ok_or_else(|| {
            AppError::NotFound(format!("Itinerary {} not found", activity.itinerary_id))
        })?;

        if !user_exists(activity.user_id) {
            return Err(AppError::NotFound(format!(
                "User {} not found",
                activity.user_id
            )));
        }

        if owner != activity.user_id {
            return Err(AppError::Forbidden(format!(
                "Activity owner {} does not own itinerary {}",
                activity.user_id, activity.itinerary_id
            )));
        }
    }
    Ok(())
}
