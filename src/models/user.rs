//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Avatar used when a user signs up without one.
pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";

/// User account stored in the database.
///
/// Owns itineraries and activities; deleting a user removes both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID)
    pub id: Uuid,
    /// Unique login name
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Argon2 PHC hash, never the plaintext
    pub password_hash: String,
    /// Avatar URL
    pub image_url: Option<String>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            image_url: image_url.or_else(|| Some(DEFAULT_IMAGE_URL.to_string())),
            created_at: Utc::now(),
        }
    }
}
