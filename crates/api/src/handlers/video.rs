//! Handlers for the `/videos` resource.
//!
//! Writes that touch media follow the stage / commit / compensate flow in
//! [`vyom_core::publishing`]: files are uploaded before the row is written
//! and removed again if the write fails.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use vyom_core::error::CoreError;
use vyom_core::feed::{FeedPage, FeedParams};
use vyom_core::ids::parse_id;
use vyom_core::media::{MediaAsset, MediaKind, MediaUpload};
use vyom_core::model::{optional_text, require_text, MediaRef, VideoRecord};
use vyom_core::publishing::{
    commit_or_compensate, release_video_media, retire, stage_asset, stage_video, THUMBNAIL_FOLDER,
    VIDEO_FOLDER,
};
use vyom_core::types::DbId;
use vyom_db::models::video::{CreateVideo, UpdateVideo};
use vyom_db::repositories::VideoRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Multipart form
// ---------------------------------------------------------------------------

/// A file part received from the client.
struct FilePart {
    file_name: String,
    bytes: Vec<u8>,
}

impl FilePart {
    fn into_upload(self, folder: &str, kind: MediaKind) -> MediaUpload {
        MediaUpload {
            bytes: self.bytes,
            file_name: self.file_name,
            folder: folder.to_string(),
            kind,
        }
    }
}

/// Fields accepted by the publish and update forms. Unknown fields are
/// ignored; empty file parts count as absent.
#[derive(Default)]
struct VideoForm {
    title: Option<String>,
    description: Option<String>,
    video_file: Option<FilePart>,
    thumbnail: Option<FilePart>,
}

async fn read_video_form(mut multipart: Multipart) -> AppResult<VideoForm> {
    let mut form = VideoForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" | "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if name == "title" {
                    form.title = Some(text);
                } else {
                    form.description = Some(text);
                }
            }
            "videoFile" | "video_file" | "thumbnail" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if bytes.is_empty() {
                    continue;
                }
                let part = FilePart {
                    file_name,
                    bytes: bytes.to_vec(),
                };
                if name == "thumbnail" {
                    form.thumbnail = Some(part);
                } else {
                    form.video_file = Some(part);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Video", id })
}

/// Load a video and check that `user` owns it.
async fn load_owned(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<VideoRecord> {
    let video = VideoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    user.ensure_owns(video.owner_id, "video")?;
    Ok(video.into())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/videos
///
/// The public feed. Query parameters: `page`, `limit`, `query`, `sortBy`,
/// `sortType`, `userId`.
pub async fn list_videos(
    State(state): State<AppState>,
    params: Result<Query<FeedParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<FeedPage>>> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let page = state.feed.list_videos(&params).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/videos
///
/// Multipart form with `title`, `description`, `videoFile` and `thumbnail`.
pub async fn publish_video(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<VideoRecord>>)> {
    let form = read_video_form(multipart).await?;

    let title = require_text("title", form.title.as_deref().unwrap_or(""))?;
    let description = require_text("description", form.description.as_deref().unwrap_or(""))?;
    let video_file = form
        .video_file
        .ok_or_else(|| CoreError::Validation("videoFile is required".into()))?;
    let thumbnail = form
        .thumbnail
        .ok_or_else(|| CoreError::Validation("thumbnail is required".into()))?;

    let media = state.media.as_ref();
    let staged = stage_video(
        media,
        video_file.into_upload(VIDEO_FOLDER, MediaKind::Video),
        thumbnail.into_upload(THUMBNAIL_FOLDER, MediaKind::Image),
    )
    .await?;

    let input = CreateVideo {
        title,
        description,
        video_file: MediaRef::from(&staged.video),
        thumbnail: MediaRef::from(&staged.thumbnail),
        duration: staged.duration,
        owner_id: user.user_id,
        is_published: None,
    };
    let video = commit_or_compensate(media, &staged.assets(), VideoRepo::create(&state.pool, &input))
        .await?;

    tracing::info!(video_id = %video.id, owner_id = %user.user_id, "Video published");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: video.into(),
        }),
    ))
}

/// GET /api/v1/videos/{id}
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<VideoRecord>>> {
    let id = parse_id("video_id", &id)?;
    let video = VideoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: video.into(),
    }))
}

/// PATCH /api/v1/videos/{id}
///
/// Multipart form with any of `title`, `description` and `thumbnail`. A new
/// thumbnail replaces the old one, which is deleted once the row is
/// updated.
pub async fn update_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<VideoRecord>>> {
    let id = parse_id("video_id", &id)?;
    let form = read_video_form(multipart).await?;

    let title = optional_text("title", form.title.as_deref())?;
    let description = optional_text("description", form.description.as_deref())?;
    if title.is_none() && description.is_none() && form.thumbnail.is_none() {
        return Err(CoreError::Validation(
            "Provide at least one of title, description or thumbnail".into(),
        )
        .into());
    }

    let existing = load_owned(&state, &user, id).await?;

    let media = state.media.as_ref();
    let new_thumbnail = match form.thumbnail {
        Some(file) => {
            let upload = file.into_upload(THUMBNAIL_FOLDER, MediaKind::Image);
            Some(stage_asset(media, upload).await?)
        }
        None => None,
    };

    let input = UpdateVideo {
        title,
        description,
        thumbnail: new_thumbnail.as_ref().map(MediaRef::from),
    };
    let staged: Vec<&MediaAsset> = new_thumbnail.iter().collect();
    let updated = commit_or_compensate(media, &staged, async {
        VideoRepo::update(&state.pool, id, &input)
            .await
            .map_err(AppError::from)
            .and_then(|row| row.ok_or_else(|| not_found(id)))
    })
    .await?;

    if new_thumbnail.is_some() {
        retire(media, &existing.thumbnail, MediaKind::Image).await;
    }

    tracing::info!(video_id = %id, "Video updated");

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// DELETE /api/v1/videos/{id}
///
/// Removes the video file and thumbnail from the media store, then the row.
pub async fn delete_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id("video_id", &id)?;
    let video = load_owned(&state, &user, id).await?;

    release_video_media(state.media.as_ref(), &video.video_file, &video.thumbnail).await?;

    if !VideoRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(video_id = %id, "Video deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/videos/{id}/publish
pub async fn toggle_publish_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<VideoRecord>>> {
    let id = parse_id("video_id", &id)?;
    load_owned(&state, &user, id).await?;

    let video = VideoRepo::toggle_published(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(video_id = %id, is_published = video.is_published, "Video publish status toggled");

    Ok(Json(DataResponse {
        data: video.into(),
    }))
}
