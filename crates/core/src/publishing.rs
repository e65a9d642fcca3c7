//! Two-phase media workflows: stage uploads, commit the record, and undo
//! the uploads when a later step fails.
//!
//! There is no transaction spanning the media store and the database. The
//! helpers here keep the two consistent by compensation: every asset that
//! was uploaded for a write that did not commit is deleted again, and a
//! failed compensation is logged with the asset's public id.

use std::future::Future;

use crate::error::CoreError;
use crate::media::{MediaAsset, MediaKind, MediaStore, MediaUpload};
use crate::model::MediaRef;

/// Folder video files are uploaded to.
pub const VIDEO_FOLDER: &str = "videos";

/// Folder thumbnails are uploaded to.
pub const THUMBNAIL_FOLDER: &str = "thumbnails";

/// The two assets of a new video, uploaded but not yet referenced by any
/// record.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedVideo {
    pub video: MediaAsset,
    pub thumbnail: MediaAsset,
    pub duration: f64,
}

impl StagedVideo {
    pub fn assets(&self) -> [&MediaAsset; 2] {
        [&self.video, &self.thumbnail]
    }
}

/// Upload a video file and its thumbnail concurrently.
///
/// If one upload fails the other is deleted before the error is returned.
/// A video the store reports without a duration is rejected and both
/// uploads are removed.
pub async fn stage_video(
    media: &dyn MediaStore,
    video: MediaUpload,
    thumbnail: MediaUpload,
) -> Result<StagedVideo, CoreError> {
    let (video_result, thumbnail_result) = tokio::join!(media.upload(video), media.upload(thumbnail));

    let (video, thumbnail) = match (video_result, thumbnail_result) {
        (Ok(v), Ok(t)) => (v, t),
        (Ok(v), Err(e)) => {
            compensate(media, &[&v]).await;
            return Err(e.into());
        }
        (Err(e), Ok(t)) => {
            compensate(media, &[&t]).await;
            return Err(e.into());
        }
        (Err(e), Err(_)) => return Err(e.into()),
    };

    let Some(duration) = video.duration else {
        compensate(media, &[&video, &thumbnail]).await;
        return Err(CoreError::Validation(
            "uploaded video file has no playable duration".into(),
        ));
    };

    tracing::info!(
        video_public_id = %video.public_id,
        thumbnail_public_id = %thumbnail.public_id,
        duration,
        "Video assets staged",
    );

    Ok(StagedVideo {
        video,
        thumbnail,
        duration,
    })
}

/// Upload a single replacement asset (e.g. a new thumbnail).
pub async fn stage_asset(media: &dyn MediaStore, upload: MediaUpload) -> Result<MediaAsset, CoreError> {
    let asset = media.upload(upload).await?;
    tracing::info!(public_id = %asset.public_id, "Asset staged");
    Ok(asset)
}

/// Await `commit`; if it fails, delete every staged asset and return the
/// commit's error unchanged.
pub async fn commit_or_compensate<T, E, F>(
    media: &dyn MediaStore,
    staged: &[&MediaAsset],
    commit: F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match commit.await {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::error!(error = %err, staged = staged.len(), "Commit failed, removing staged media");
            compensate(media, staged).await;
            Err(err)
        }
    }
}

/// Best-effort delete of assets that no committed record references.
/// Failures are logged, never returned.
pub async fn compensate(media: &dyn MediaStore, assets: &[&MediaAsset]) {
    for asset in assets {
        if let Err(e) = media.delete(&asset.public_id, asset.kind).await {
            tracing::warn!(
                public_id = %asset.public_id,
                error = %e,
                "Failed to remove orphaned media asset",
            );
        }
    }
}

/// Delete an asset that a committed update just replaced. Failures are
/// logged; the record is already consistent.
pub async fn retire(media: &dyn MediaStore, old: &MediaRef, kind: MediaKind) {
    if let Err(e) = media.delete(&old.public_id, kind).await {
        tracing::warn!(
            public_id = %old.public_id,
            error = %e,
            "Failed to delete replaced media asset",
        );
    }
}

/// Delete the media of a video that is about to be removed. Errors are
/// returned so the record is only deleted once its media is gone; deletes
/// are idempotent so the caller can simply retry.
pub async fn release_video_media(
    media: &dyn MediaStore,
    video_file: &MediaRef,
    thumbnail: &MediaRef,
) -> Result<(), CoreError> {
    media.delete(&video_file.public_id, MediaKind::Video).await?;
    media.delete(&thumbnail.public_id, MediaKind::Image).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
