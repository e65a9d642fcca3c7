//! Route definitions for tweets.
//!
//! Mounted at `/tweets`.
//!
//! ```text
//! POST   /                 create_tweet
//! GET    /user/{user_id}   get_user_tweets
//! PATCH  /{id}             update_tweet
//! DELETE /{id}             delete_tweet
//! ```

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::tweet;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(tweet::create_tweet))
        .route("/user/{user_id}", get(tweet::get_user_tweets))
        .route(
            "/{id}",
            patch(tweet::update_tweet).delete(tweet::delete_tweet),
        )
}
