use std::sync::Arc;
use std::time::Duration;

use vyom_core::feed::FeedService;
use vyom_core::media::MediaStore;
use vyom_db::feed_store::PgFeedStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vyom_db::DbPool,
    /// Server configuration (JWT secret, timeouts).
    pub config: Arc<ServerConfig>,
    /// Public video feed, backed by [`PgFeedStore`].
    pub feed: FeedService,
    /// External store for video files and thumbnails.
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    pub fn new(pool: vyom_db::DbPool, config: ServerConfig, media: Arc<dyn MediaStore>) -> Self {
        let store = PgFeedStore::new(
            pool.clone(),
            Duration::from_secs(config.store_timeout_secs),
        );
        Self {
            pool,
            config: Arc::new(config),
            feed: FeedService::new(Arc::new(store)),
            media,
        }
    }
}
