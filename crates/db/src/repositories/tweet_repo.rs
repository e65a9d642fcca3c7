//! Repository for the `tweets` table.

use sqlx::PgPool;
use vyom_core::ids::new_id;
use vyom_core::types::DbId;

use crate::models::tweet::{CreateTweet, Tweet};

const COLUMNS: &str = "id, content, owner_id, created_at, updated_at";

pub struct TweetRepo;

impl TweetRepo {
    pub async fn create(pool: &PgPool, input: &CreateTweet) -> Result<Tweet, sqlx::Error> {
        let query = format!(
            "INSERT INTO tweets (id, content, owner_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tweet>(&query)
            .bind(new_id())
            .bind(&input.content)
            .bind(input.owner_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tweet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tweets WHERE id = $1");
        sqlx::query_as::<_, Tweet>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of a user's tweets, newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Tweet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tweets
             WHERE owner_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Tweet>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_owner(pool: &PgPool, owner_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tweets WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Replace a tweet's content. Returns `None` if the tweet does not exist.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        content: &str,
    ) -> Result<Option<Tweet>, sqlx::Error> {
        let query = format!(
            "UPDATE tweets SET content = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tweet>(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
