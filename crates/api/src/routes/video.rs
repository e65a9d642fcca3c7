//! Route definitions for videos.
//!
//! Mounted at `/videos`.
//!
//! ```text
//! GET    /                 list_videos
//! POST   /                 publish_video
//! GET    /{id}             get_video
//! PATCH  /{id}             update_video
//! DELETE /{id}             delete_video
//! PATCH  /{id}/publish     toggle_publish_status
//! ```

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::video;
use crate::state::AppState;

/// Upper bound on a multipart upload body (video file plus thumbnail).
pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(video::list_videos).post(video::publish_video))
        .route(
            "/{id}",
            get(video::get_video)
                .patch(video::update_video)
                .delete(video::delete_video),
        )
        .route("/{id}/publish", patch(video::toggle_publish_status))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
