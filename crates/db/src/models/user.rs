//! User rows. Users are provisioned by the auth service; this table keeps
//! the profile fields other records are joined with.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vyom_core::model::{OwnerProjection, UserRecord};
use vyom_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        UserRecord {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            avatar: user.avatar,
        }
    }
}

impl From<User> for OwnerProjection {
    fn from(user: User) -> Self {
        UserRecord::from(user).into()
    }
}

/// DTO for inserting a user mirrored from the auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub full_name: String,
    #[serde(default)]
    pub avatar: String,
}
