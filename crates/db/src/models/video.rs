//! Video rows and DTOs.
//!
//! Media references are stored as flat columns (`video_file_url`,
//! `video_public_id`, ...) and nested back into [`MediaRef`]s when a row is
//! converted to the domain [`VideoRecord`].

use serde::Serialize;
use sqlx::FromRow;
use vyom_core::model::{MediaRef, VideoRecord};
use vyom_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub video_file_url: String,
    pub video_public_id: String,
    pub thumbnail_url: String,
    pub thumbnail_public_id: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Video> for VideoRecord {
    fn from(row: Video) -> Self {
        VideoRecord {
            id: row.id,
            title: row.title,
            description: row.description,
            video_file: MediaRef {
                url: row.video_file_url,
                public_id: row.video_public_id,
            },
            thumbnail: MediaRef {
                url: row.thumbnail_url,
                public_id: row.thumbnail_public_id,
            },
            duration: row.duration,
            views: row.views,
            is_published: row.is_published,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for inserting a video whose media has already been uploaded.
#[derive(Debug, Clone)]
pub struct CreateVideo {
    pub title: String,
    pub description: String,
    pub video_file: MediaRef,
    pub thumbnail: MediaRef,
    pub duration: f64,
    pub owner_id: DbId,
    /// Defaults to `true` when `None`.
    pub is_published: Option<bool>,
}

/// DTO for partially updating a video. Only `Some` fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<MediaRef>,
}

impl UpdateVideo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.thumbnail.is_none()
    }
}
