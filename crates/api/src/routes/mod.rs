pub mod health;
pub mod tweet;
pub mod video;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /videos                          list (public feed), publish (auth, multipart)
/// /videos/{id}                     get, update (auth, multipart), delete (auth)
/// /videos/{id}/publish             toggle publish status (auth)
///
/// /tweets                          create (auth)
/// /tweets/user/{user_id}           list a user's tweets
/// /tweets/{id}                     update, delete (auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/videos", video::router())
        .nest("/tweets", tweet::router())
}
