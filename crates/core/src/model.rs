//! Record types shared by every store implementation.
//!
//! These are the storage-agnostic shapes the feed engine works with. The
//! `vyom-db` crate converts its `FromRow` rows into them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A reference to a binary asset held by the external media store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub public_id: String,
}

/// A published (or unpublished) video.
///
/// `video_file` and `thumbnail` are set together at creation; neither is
/// ever nulled independently of the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub video_file: MediaRef,
    pub thumbnail: MediaRef,
    /// Length in seconds, as reported by the media store.
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The subset of a user the feed needs. Users are owned by the external
/// auth service; this core only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: DbId,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

/// Reduced owner projection joined into feed results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerProjection {
    pub id: DbId,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

impl From<UserRecord> for OwnerProjection {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            avatar: user.avatar,
        }
    }
}

/// One element of a feed page: the video, its relevance score when a
/// search was applied, and its owner (absent when the owner is gone).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    #[serde(flatten)]
    pub video: VideoRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub owner: Option<OwnerProjection>,
}

// ---------------------------------------------------------------------------
// Field resolution (opaque sort fields)
// ---------------------------------------------------------------------------

/// A dynamically resolved field value, ordered the way a document store
/// orders mixed types: null sorts lowest, then numbers, text, ids,
/// booleans, timestamps.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Number(f64),
    Text(String),
    Id(DbId),
    Bool(bool),
    Time(Timestamp),
}

impl FieldValue {
    fn type_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
            Self::Id(_) => 3,
            Self::Bool(_) => 4,
            Self::Time(_) => 5,
        }
    }

    /// Total order used by in-process sorting.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Id(a), Self::Id(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl VideoRecord {
    /// Resolve a field by its serialized name (dotted paths reach into
    /// media references). Unknown names resolve to [`FieldValue::Null`].
    pub fn field_value(&self, field: &str) -> FieldValue {
        match canonical_field(field) {
            "id" => FieldValue::Id(self.id),
            "title" => FieldValue::Text(self.title.clone()),
            "description" => FieldValue::Text(self.description.clone()),
            "video_file.url" => FieldValue::Text(self.video_file.url.clone()),
            "video_file.public_id" => FieldValue::Text(self.video_file.public_id.clone()),
            "thumbnail.url" => FieldValue::Text(self.thumbnail.url.clone()),
            "thumbnail.public_id" => FieldValue::Text(self.thumbnail.public_id.clone()),
            "duration" => FieldValue::Number(self.duration),
            "views" => FieldValue::Number(self.views as f64),
            "is_published" => FieldValue::Bool(self.is_published),
            "owner_id" => FieldValue::Id(self.owner_id),
            "created_at" => FieldValue::Time(self.created_at),
            "updated_at" => FieldValue::Time(self.updated_at),
            _ => FieldValue::Null,
        }
    }
}

/// Map the camelCase names older clients send (`createdAt`,
/// `videoFile.url`, ...) onto the serialized snake_case names. Other names
/// pass through unchanged.
pub fn canonical_field(field: &str) -> &str {
    match field {
        "videoFile.url" => "video_file.url",
        "videoFile.publicId" | "videoFile.public_id" | "video_file.publicId" => {
            "video_file.public_id"
        }
        "thumbnail.publicId" => "thumbnail.public_id",
        "isPublished" => "is_published",
        "ownerId" | "owner" => "owner_id",
        "createdAt" => "created_at",
        "updatedAt" => "updated_at",
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

/// Trim a required text input, rejecting blank values.
pub fn require_text(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Like [`require_text`] for optional patch fields: `None` stays `None`.
pub fn optional_text(field: &str, value: Option<&str>) -> Result<Option<String>, CoreError> {
    value.map(|v| require_text(field, v)).transpose()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
