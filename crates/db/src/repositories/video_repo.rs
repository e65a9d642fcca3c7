//! Repository for the `videos` table.
//!
//! Listing is not done here: the public feed goes through
//! [`crate::feed_store::PgFeedStore`].

use sqlx::PgPool;
use vyom_core::ids::new_id;
use vyom_core::types::DbId;

use crate::models::video::{CreateVideo, UpdateVideo, Video};

/// Column list shared across queries to avoid repetition.
pub const COLUMNS: &str = "id, title, description, video_file_url, video_public_id, \
     thumbnail_url, thumbnail_public_id, duration, views, is_published, owner_id, \
     created_at, updated_at";

pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video, returning the created row.
    ///
    /// If `is_published` is `None`, defaults to `true`. Views start at 0.
    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos (id, title, description, video_file_url, video_public_id,
                                 thumbnail_url, thumbnail_public_id, duration, owner_id, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(new_id())
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.video_file.url)
            .bind(&input.video_file.public_id)
            .bind(&input.thumbnail.url)
            .bind(&input.thumbnail.public_id)
            .bind(input.duration)
            .bind(input.owner_id)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a video. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail_url = COALESCE($4, thumbnail_url),
                thumbnail_public_id = COALESCE($5, thumbnail_public_id),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.thumbnail.as_ref().map(|t| t.url.as_str()))
            .bind(input.thumbnail.as_ref().map(|t| t.public_id.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Flip `is_published`, returning the updated row.
    pub async fn toggle_published(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET is_published = NOT is_published, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a video by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
