//! Feed service: the public entry point of the feed engine.

use std::sync::Arc;

use crate::error::CoreError;
use crate::feed::builder::build_feed_plan;
use crate::feed::engine::paginate;
use crate::feed::page::FeedPage;
use crate::feed::query::{FeedParams, FeedQuery};
use crate::store::DocumentStore;

/// Read-only orchestration of query validation, pipeline building and
/// pagination. Holds no per-request state, so one instance is shared by
/// every concurrent request.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn DocumentStore>,
}

impl FeedService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// List published videos for raw request parameters.
    ///
    /// A malformed `user_id` is rejected with
    /// [`CoreError::InvalidReference`] before the store is touched. Store
    /// failures surface as [`CoreError::StoreUnavailable`].
    pub async fn list_videos(&self, params: &FeedParams) -> Result<FeedPage, CoreError> {
        let query = FeedQuery::from_params(params)?;
        self.execute(&query).await
    }

    /// Run an already-validated query.
    pub async fn execute(&self, query: &FeedQuery) -> Result<FeedPage, CoreError> {
        let plan = build_feed_plan(query);

        tracing::debug!(
            stages = ?plan.pipeline.stage_names(),
            search = ?query.search,
            owner_id = ?query.owner_id,
            "Executing feed query",
        );

        let page = paginate(self.store.as_ref(), &plan.pipeline, plan.page).await?;
        Ok(page)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
