//! In-process [`DocumentStore`] used by tests and local tooling.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::feed::enrichment::attach_owners;
use crate::feed::pipeline::{Predicate, SearchField, SearchStage, SortKey, SortTarget, Stage};
use crate::feed::query::SortDirection;
use crate::model::{FeedEntry, FieldValue, OwnerProjection, UserRecord, VideoRecord};
use crate::search::relevance_score;
use crate::store::{DocumentStore, StoreError};
use crate::types::DbId;

/// Videos and users held in memory. Stages are evaluated one after another
/// over a snapshot taken under the read lock.
#[derive(Default)]
pub struct MemoryStore {
    videos: RwLock<Vec<VideoRecord>>,
    users: RwLock<HashMap<DbId, OwnerProjection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_video(&self, video: VideoRecord) {
        self.videos.write().await.push(video);
    }

    /// Remove a video by id. Returns `true` if it existed.
    pub async fn remove_video(&self, id: DbId) -> bool {
        let mut videos = self.videos.write().await;
        let before = videos.len();
        videos.retain(|v| v.id != id);
        videos.len() != before
    }

    pub async fn insert_user(&self, user: UserRecord) {
        self.users.write().await.insert(user.id, user.into());
    }

    /// Drop a user without touching their videos, leaving them orphaned.
    pub async fn remove_user(&self, id: DbId) -> bool {
        self.users.write().await.remove(&id).is_some()
    }

    pub async fn video_count(&self) -> usize {
        self.videos.read().await.len()
    }

    async fn run(&self, stages: &[Stage]) -> Vec<FeedEntry> {
        let mut entries: Vec<FeedEntry> = self
            .videos
            .read()
            .await
            .iter()
            .cloned()
            .map(|video| FeedEntry {
                video,
                score: None,
                owner: None,
            })
            .collect();

        for stage in stages {
            entries = match stage {
                Stage::Search(search) => apply_search(entries, search),
                Stage::Match(predicates) => entries
                    .into_iter()
                    .filter(|e| predicates.iter().all(|p| matches_predicate(&e.video, p)))
                    .collect(),
                Stage::Sort(keys) => {
                    // Stable sort: records equal on every key keep store order.
                    entries.sort_by(|a, b| compare_entries(a, b, keys));
                    entries
                }
                Stage::LookupOwner => {
                    let users = self.users.read().await;
                    attach_owners(entries, &users)
                }
                Stage::Skip(n) => entries.into_iter().skip(to_usize(*n)).collect(),
                Stage::Limit(n) => entries.into_iter().take(to_usize(*n)).collect(),
            };
        }

        entries
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn aggregate(&self, stages: &[Stage]) -> Result<Vec<FeedEntry>, StoreError> {
        Ok(self.run(stages).await)
    }

    async fn count(&self, stages: &[Stage]) -> Result<u64, StoreError> {
        let filtering: Vec<Stage> = stages
            .iter()
            .filter(|s| s.is_filtering())
            .cloned()
            .collect();
        Ok(self.run(&filtering).await.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Stage evaluation
// ---------------------------------------------------------------------------

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

fn apply_search(entries: Vec<FeedEntry>, search: &SearchStage) -> Vec<FeedEntry> {
    entries
        .into_iter()
        .filter_map(|mut entry| {
            let fields: Vec<(&str, f64)> = search
                .fields
                .iter()
                .map(|f| (text_field(&entry.video, *f), f.weight()))
                .collect();
            let score = relevance_score(&search.terms, &fields, search.fuzzy)?;
            entry.score = Some(score);
            Some(entry)
        })
        .collect()
}

fn text_field(video: &VideoRecord, field: SearchField) -> &str {
    match field {
        SearchField::Title => &video.title,
        SearchField::Description => &video.description,
    }
}

fn matches_predicate(video: &VideoRecord, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::OwnerEquals(owner_id) => video.owner_id == *owner_id,
        Predicate::PublishedEquals(published) => video.is_published == *published,
    }
}

fn sort_value(entry: &FeedEntry, key: &SortKey) -> FieldValue {
    match key.target() {
        SortTarget::Relevance => entry.score.map_or(FieldValue::Null, FieldValue::Number),
        SortTarget::Field(name) => entry.video.field_value(name),
    }
}

fn compare_entries(a: &FeedEntry, b: &FeedEntry, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = sort_value(a, key).total_cmp(&sort_value(b, key));
        let ordering = match key.direction() {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
