//! Pagination engine: runs a built pipeline for one page.

use std::time::Instant;

use crate::feed::page::{FeedPage, PageRequest};
use crate::feed::pipeline::Pipeline;
use crate::store::{DocumentStore, StoreError};

/// Execute `pipeline` for the `request` window.
///
/// The total count (filtering stages only) and the windowed fetch are issued
/// concurrently; if either fails the whole call fails and no partial page is
/// returned. Dropping the future drops both store calls.
///
/// A page beyond the last one is not an error: it comes back empty with the
/// true total.
pub async fn paginate(
    store: &dyn DocumentStore,
    pipeline: &Pipeline,
    request: PageRequest,
) -> Result<FeedPage, StoreError> {
    let start = Instant::now();

    let count_stages = pipeline.filtering_stages();
    let fetch_stages = pipeline.windowed(request.offset(), request.page_size());

    let (total, mut items) =
        tokio::try_join!(store.count(&count_stages), store.aggregate(&fetch_stages))?;

    // Adapters are trusted to honor Limit, but the page contract is ours.
    items.truncate(request.page_size() as usize);

    tracing::debug!(
        page = request.page(),
        page_size = request.page_size(),
        total,
        returned = items.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Feed page executed",
    );

    Ok(FeedPage::new(items, total, request))
}
