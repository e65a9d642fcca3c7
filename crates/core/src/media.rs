//! External media store seam (video files and thumbnails).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::MediaRef;

/// The resource class an asset is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn resource_type(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }
}

/// A file to upload.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    /// Folder below the store's configured root, e.g. `videos`.
    pub folder: String,
    pub kind: MediaKind,
}

/// An asset held by the media store.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    pub url: String,
    pub public_id: String,
    /// Playback length in seconds; only reported for video resources.
    pub duration: Option<f64>,
    pub kind: MediaKind,
}

impl From<&MediaAsset> for MediaRef {
    fn from(asset: &MediaAsset) -> Self {
        MediaRef {
            url: asset.url.clone(),
            public_id: asset.public_id.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The store refused the request (bad file, bad signature, ...).
    #[error("media store rejected request: {0}")]
    Rejected(String),

    /// The store could not be reached or failed internally.
    #[error("media store unreachable: {0}")]
    Unavailable(String),
}

impl From<MediaError> for CoreError {
    fn from(err: MediaError) -> Self {
        CoreError::MediaUnavailable(err.to_string())
    }
}

/// Upload and delete binary assets.
///
/// `delete` of an asset the store no longer has succeeds, so deletes can
/// be retried safely.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, upload: MediaUpload) -> Result<MediaAsset, MediaError>;

    async fn delete(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaError>;
}
