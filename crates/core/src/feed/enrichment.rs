//! Owner enrichment: joining videos with a reduced view of their owner.

use std::collections::{HashMap, HashSet};

use crate::model::{FeedEntry, OwnerProjection, VideoRecord};
use crate::types::DbId;

/// A video that has passed search and filtering, with its score if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredVideo {
    pub video: VideoRecord,
    pub score: Option<f64>,
}

impl From<ScoredVideo> for FeedEntry {
    fn from(scored: ScoredVideo) -> Self {
        FeedEntry {
            video: scored.video,
            score: scored.score,
            owner: None,
        }
    }
}

/// Distinct owner ids referenced by `videos`, in first-seen order.
pub fn owner_ids<'a>(videos: impl IntoIterator<Item = &'a VideoRecord>) -> Vec<DbId> {
    let mut seen = HashSet::new();
    videos
        .into_iter()
        .map(|v| v.owner_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Attach each entry's owner from `owners`.
///
/// An entry whose owner is missing keeps `owner = None`; it is never
/// dropped. Order is preserved.
pub fn attach_owners(
    entries: Vec<FeedEntry>,
    owners: &HashMap<DbId, OwnerProjection>,
) -> Vec<FeedEntry> {
    entries
        .into_iter()
        .map(|mut entry| {
            entry.owner = owners.get(&entry.video.owner_id).cloned();
            entry
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::MediaRef;

    fn video(owner_id: DbId) -> VideoRecord {
        let now = Utc::now();
        VideoRecord {
            id: crate::ids::new_id(),
            title: "t".into(),
            description: "d".into(),
            video_file: MediaRef {
                url: "u".into(),
                public_id: "p".into(),
            },
            thumbnail: MediaRef {
                url: "u".into(),
                public_id: "p".into(),
            },
            duration: 1.0,
            views: 0,
            is_published: true,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn projection(id: DbId) -> OwnerProjection {
        OwnerProjection {
            id,
            username: "alice".into(),
            full_name: "Alice A".into(),
            avatar: "https://media.example/a.png".into(),
        }
    }

    #[test]
    fn owner_ids_are_distinct() {
        let a = crate::ids::new_id();
        let b = crate::ids::new_id();
        let videos = [video(a), video(b), video(a)];
        assert_eq!(owner_ids(&videos), vec![a, b]);
    }

    #[test]
    fn missing_owner_keeps_entry_with_null_owner() {
        let present = crate::ids::new_id();
        let gone = crate::ids::new_id();
        let entries: Vec<FeedEntry> = [video(present), video(gone)]
            .into_iter()
            .map(|v| ScoredVideo { video: v, score: None }.into())
            .collect();
        let owners = HashMap::from([(present, projection(present))]);

        let enriched = attach_owners(entries, &owners);

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].owner, Some(projection(present)));
        assert_eq!(enriched[1].owner, None);
        assert_eq!(enriched[1].video.owner_id, gone);
    }
}
