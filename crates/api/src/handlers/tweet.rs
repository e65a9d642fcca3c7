//! Handlers for the `/tweets` resource.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use vyom_core::error::CoreError;
use vyom_core::feed::Page;
use vyom_core::ids::parse_id;
use vyom_core::model::require_text;
use vyom_core::types::DbId;
use vyom_db::models::tweet::{CreateTweet, Tweet, TweetContent};
use vyom_db::repositories::TweetRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Tweet", id })
}

async fn load_owned(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Tweet> {
    let tweet = TweetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    user.ensure_owns(tweet.owner_id, "tweet")?;
    Ok(tweet)
}

/// POST /api/v1/tweets
pub async fn create_tweet(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<TweetContent>,
) -> AppResult<(StatusCode, Json<DataResponse<Tweet>>)> {
    let input = CreateTweet {
        content: require_text("content", &body.content)?,
        owner_id: user.user_id,
    };
    let tweet = TweetRepo::create(&state.pool, &input).await?;

    tracing::info!(tweet_id = %tweet.id, owner_id = %user.user_id, "Tweet created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: tweet })))
}

/// GET /api/v1/tweets/user/{user_id}
///
/// Newest first, paged with `page` and `limit`.
pub async fn get_user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<Page<Tweet>>>> {
    let owner_id = parse_id("user_id", &user_id)?;
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let request = params.to_request();

    let limit = i64::try_from(request.page_size()).unwrap_or(i64::MAX);
    let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
    let (items, total) = tokio::try_join!(
        TweetRepo::list_by_owner(&state.pool, owner_id, limit, offset),
        TweetRepo::count_by_owner(&state.pool, owner_id),
    )?;

    let total = u64::try_from(total).unwrap_or_default();
    Ok(Json(DataResponse {
        data: Page::new(items, total, request),
    }))
}

/// PATCH /api/v1/tweets/{id}
pub async fn update_tweet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<TweetContent>,
) -> AppResult<Json<DataResponse<Tweet>>> {
    let id = parse_id("tweet_id", &id)?;
    let content = require_text("content", &body.content)?;
    load_owned(&state, &user, id).await?;

    let tweet = TweetRepo::update_content(&state.pool, id, &content)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(tweet_id = %id, "Tweet updated");
    Ok(Json(DataResponse { data: tweet }))
}

/// DELETE /api/v1/tweets/{id}
pub async fn delete_tweet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id("tweet_id", &id)?;
    load_owned(&state, &user, id).await?;

    if !TweetRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(tweet_id = %id, "Tweet deleted");
    Ok(StatusCode::NO_CONTENT)
}
