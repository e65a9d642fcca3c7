//! The document store adapter seam.
//!
//! The feed engine only ever talks to a [`DocumentStore`]; the concrete
//! adapter (PostgreSQL in `vyom-db`, or [`memory::MemoryStore`]) is injected
//! by whoever builds the [`FeedService`](crate::feed::FeedService).

pub mod memory;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::feed::pipeline::Stage;
use crate::model::FeedEntry;

/// Failures raised by a store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing database failed or is unreachable.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The adapter's call-level timeout elapsed.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// The adapter cannot execute this stage sequence.
    #[error("unsupported pipeline: {0}")]
    UnsupportedPipeline(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnsupportedPipeline(msg) => {
                CoreError::Internal(format!("unsupported pipeline: {msg}"))
            }
            other => CoreError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Read access to the video collection through pipeline stages.
///
/// Implementations must apply stages in the given order with these
/// semantics:
///
/// - `Search`: keep records where at least one term fuzzy-matches, attach
///   the relevance score from [`crate::search::relevance_score`].
/// - `Match`: keep records satisfying every predicate.
/// - `Sort`: order by the keys; an unknown field sorts as null, null is the
///   lowest value (last when descending).
/// - `LookupOwner`: attach the owner projection, `None` if the owner is gone.
/// - `Skip`/`Limit`: window the result.
///
/// Dropping a returned future must abandon the underlying call.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Run the stages and return the resulting entries.
    async fn aggregate(&self, stages: &[Stage]) -> Result<Vec<FeedEntry>, StoreError>;

    /// Count the records the stages produce. Callers pass only filtering
    /// stages; adapters ignore any others.
    async fn count(&self, stages: &[Stage]) -> Result<u64, StoreError>;
}
