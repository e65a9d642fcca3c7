//! Translates a [`FeedQuery`] into an ordered [`Pipeline`].

use crate::feed::page::PageRequest;
use crate::feed::pipeline::{Pipeline, Predicate, SearchField, SearchStage, SortKey, Stage};
use crate::feed::query::{FeedQuery, SortDirection, DEFAULT_SORT_FIELD};
use crate::search::{search_terms, FuzzyOptions};

/// Field used as the final, deterministic tie-breaker of every sort.
pub const TIE_BREAK_FIELD: &str = "id";

/// A built pipeline plus the normalized window to run it with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPlan {
    pub pipeline: Pipeline,
    pub page: PageRequest,
}

/// Build the feed pipeline.
///
/// Stage order is fixed:
///
/// 1. `Search` when the query has usable search terms.
/// 2. `Match` with the optional owner filter and, always, `published = true`.
///    Unpublished videos never leave the public feed.
/// 3. `Sort`:
///    - search without explicit sort: relevance desc, then `created_at` desc;
///    - explicit sort: that field in the requested direction;
///    - otherwise `created_at` desc.
///
///    Every variant ends with `id` desc so equal keys order deterministically.
/// 4. `LookupOwner`.
pub fn build_feed_plan(query: &FeedQuery) -> FeedPlan {
    let mut pipeline = Pipeline::new();

    let search = query
        .search
        .as_deref()
        .map(|text| (text, search_terms(text)))
        .filter(|(_, terms)| !terms.is_empty());
    let has_search = search.is_some();

    if let Some((text, terms)) = search {
        pipeline.push(Stage::Search(SearchStage {
            text: text.to_string(),
            terms,
            fields: vec![SearchField::Title, SearchField::Description],
            fuzzy: FuzzyOptions::default(),
        }));
    }

    let mut predicates = Vec::with_capacity(2);
    if let Some(owner_id) = query.owner_id {
        predicates.push(Predicate::OwnerEquals(owner_id));
    }
    predicates.push(Predicate::PublishedEquals(true));
    pipeline.push(Stage::Match(predicates));

    pipeline.push(Stage::Sort(sort_keys(query, has_search)));
    pipeline.push(Stage::LookupOwner);

    FeedPlan {
        pipeline,
        page: PageRequest::new(query.page, query.page_size),
    }
}

fn sort_keys(query: &FeedQuery, has_search: bool) -> Vec<SortKey> {
    let mut keys = match (&query.sort, has_search) {
        (None, true) => vec![
            SortKey::Relevance(SortDirection::Desc),
            SortKey::field(DEFAULT_SORT_FIELD, SortDirection::Desc),
        ],
        (Some(spec), _) => vec![SortKey::field(spec.field.clone(), spec.direction)],
        (None, false) => vec![SortKey::field(DEFAULT_SORT_FIELD, SortDirection::Desc)],
    };

    let already_tie_broken = matches!(
        keys.last(),
        Some(SortKey::Field { name, .. }) if name == TIE_BREAK_FIELD
    );
    if !already_tie_broken {
        keys.push(SortKey::field(TIE_BREAK_FIELD, SortDirection::Desc));
    }
    keys
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
