use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vyom_core::types::{DbId, Timestamp};

/// A row from the `tweets` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Tweet {
    pub id: DbId,
    pub content: String,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a tweet. `owner_id` comes from the authenticated user,
/// never from the request body.
#[derive(Debug, Clone)]
pub struct CreateTweet {
    pub content: String,
    pub owner_id: DbId,
}

/// Request body for creating or editing a tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct TweetContent {
    pub content: String,
}
