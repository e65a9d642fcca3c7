//! [`DocumentStore`] backed by PostgreSQL.
//!
//! A pipeline is folded into one `SELECT` over `videos`:
//!
//! - `Search` becomes a `LEFT JOIN LATERAL` computing the relevance score
//!   with `levenshtein_less_equal` (extension `fuzzystrmatch`), plus
//!   `s.score IS NOT NULL` in the `WHERE` clause;
//! - `Match` predicates become `AND`ed conditions;
//! - `Sort` becomes `ORDER BY`, nulls lowest in both directions;
//! - `Skip`/`Limit` become `OFFSET`/`LIMIT`.
//!
//! `LookupOwner` runs as a second, batched query against `users` so a
//! missing owner yields `owner = None` instead of dropping the row.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use vyom_core::feed::enrichment::{attach_owners, owner_ids};
use vyom_core::feed::pipeline::{
    is_canonical_order, Predicate, SearchStage, SortKey, SortTarget, Stage,
};
use vyom_core::feed::SortDirection;
use vyom_core::model::{canonical_field, FeedEntry, OwnerProjection};
use vyom_core::store::{DocumentStore, StoreError};
use vyom_core::types::DbId;

use crate::models::video::Video;
use crate::repositories::UserRepo;

const VIDEO_COLUMNS: &str = "v.id, v.title, v.description, v.video_file_url, v.video_public_id, \
     v.thumbnail_url, v.thumbnail_public_id, v.duration, v.views, v.is_published, v.owner_id, \
     v.created_at, v.updated_at";

/// `levenshtein_less_equal` rejects arguments longer than this.
const LEVENSHTEIN_MAX_CHARS: i32 = 255;

pub struct PgFeedStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgFeedStore {
    /// `timeout` bounds each `aggregate`/`count` call as a whole.
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| {
                tracing::error!(operation, error = %e, "Feed store query failed");
                StoreError::Backend(e.to_string())
            }),
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Feed store query timed out",
                );
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }

    async fn fetch(&self, plan: &SqlPlan<'_>) -> Result<Vec<FeedEntry>, sqlx::Error> {
        let mut query = plan.select_query();
        let rows = query.build_query_as::<FeedRow>().fetch_all(&self.pool).await?;
        let entries: Vec<FeedEntry> = rows.into_iter().map(FeedEntry::from).collect();

        if !plan.lookup_owner {
            return Ok(entries);
        }

        let ids = owner_ids(entries.iter().map(|e| &e.video));
        let owners: HashMap<DbId, OwnerProjection> = UserRepo::find_by_ids(&self.pool, &ids)
            .await?
            .into_iter()
            .map(|user| (user.id, OwnerProjection::from(user)))
            .collect();

        Ok(attach_owners(entries, &owners))
    }
}

#[async_trait]
impl DocumentStore for PgFeedStore {
    async fn aggregate(&self, stages: &[Stage]) -> Result<Vec<FeedEntry>, StoreError> {
        let plan = SqlPlan::from_stages(stages)?;
        self.bounded("aggregate", self.fetch(&plan)).await
    }

    async fn count(&self, stages: &[Stage]) -> Result<u64, StoreError> {
        let filtering: Vec<Stage> = stages
            .iter()
            .filter(|s| s.is_filtering())
            .cloned()
            .collect();
        let plan = SqlPlan::from_stages(&filtering)?;
        let mut query = plan.count_query();
        let total: i64 = self
            .bounded("count", query.build_query_scalar::<i64>().fetch_one(&self.pool))
            .await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(FromRow)]
struct FeedRow {
    #[sqlx(flatten)]
    video: Video,
    score: Option<f64>,
}

impl From<FeedRow> for FeedEntry {
    fn from(row: FeedRow) -> Self {
        FeedEntry {
            video: row.video.into(),
            score: row.score,
            owner: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage -> SQL
// ---------------------------------------------------------------------------

/// Stages collected into the clauses of a single statement.
#[derive(Debug, Default)]
struct SqlPlan<'s> {
    search: Option<&'s SearchStage>,
    predicates: Vec<&'s Predicate>,
    sort: Option<&'s [SortKey]>,
    lookup_owner: bool,
    skip: Option<u64>,
    limit: Option<u64>,
}

impl<'s> SqlPlan<'s> {
    /// Only pipelines in canonical order with at most one stage of each
    /// kind (match stages excepted) map onto one statement.
    fn from_stages(stages: &'s [Stage]) -> Result<Self, StoreError> {
        if !is_canonical_order(stages) {
            let names: Vec<&str> = stages.iter().map(Stage::name).collect();
            return Err(StoreError::UnsupportedPipeline(format!(
                "stages out of order: {}",
                names.join(" -> ")
            )));
        }

        let duplicate = |name: &str| StoreError::UnsupportedPipeline(format!("more than one {name} stage"));
        let mut plan = SqlPlan::default();

        for stage in stages {
            match stage {
                Stage::Search(search) => {
                    if plan.search.replace(search).is_some() {
                        return Err(duplicate("search"));
                    }
                }
                Stage::Match(predicates) => plan.predicates.extend(predicates.iter()),
                Stage::Sort(keys) => {
                    if plan.sort.replace(keys.as_slice()).is_some() {
                        return Err(duplicate("sort"));
                    }
                }
                Stage::LookupOwner => plan.lookup_owner = true,
                Stage::Skip(n) => {
                    if plan.skip.replace(*n).is_some() {
                        return Err(duplicate("skip"));
                    }
                }
                Stage::Limit(n) => {
                    if plan.limit.replace(*n).is_some() {
                        return Err(duplicate("limit"));
                    }
                }
            }
        }

        Ok(plan)
    }

    fn select_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(VIDEO_COLUMNS);
        qb.push(if self.search.is_some() {
            ", s.score"
        } else {
            ", NULL::float8 AS score"
        });
        self.push_from_where(&mut qb);
        self.push_order_by(&mut qb);

        if let Some(skip) = self.skip {
            qb.push(" OFFSET ").push_bind(to_i64(skip));
        }
        if let Some(limit) = self.limit {
            qb.push(" LIMIT ").push_bind(to_i64(limit));
        }
        qb
    }

    fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*)");
        self.push_from_where(&mut qb);
        qb
    }

    fn push_from_where(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        qb.push(" FROM videos v");
        if let Some(search) = self.search {
            push_search_join(qb, search);
        }

        qb.push(" WHERE TRUE");
        if self.search.is_some() {
            qb.push(" AND s.score IS NOT NULL");
        }
        for predicate in &self.predicates {
            match predicate {
                Predicate::OwnerEquals(owner_id) => {
                    qb.push(" AND v.owner_id = ").push_bind(*owner_id);
                }
                Predicate::PublishedEquals(published) => {
                    qb.push(" AND v.is_published = ").push_bind(*published);
                }
            }
        }
    }

    fn push_order_by(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let Some(keys) = self.sort else { return };
        let terms: Vec<String> = keys
            .iter()
            .filter_map(|key| {
                let expr = sort_expression(key, self.search.is_some())?;
                Some(format!("{expr} {}", null_ordering(key.direction())))
            })
            .collect();
        if !terms.is_empty() {
            qb.push(" ORDER BY ").push(terms.join(", "));
        }
    }
}

/// Per term, the best `weight / (1 + distance)` over every word of every
/// searched field; the row score is the sum over terms, NULL when no term
/// matched.
fn push_search_join(qb: &mut QueryBuilder<'static, Postgres>, search: &SearchStage) {
    let max_edits = i32::try_from(search.fuzzy.max_edits).unwrap_or(i32::MAX);
    let prefix = i32::try_from(search.fuzzy.prefix_length).unwrap_or(i32::MAX);

    qb.push(" LEFT JOIN LATERAL (SELECT SUM(best) AS score FROM (SELECT MAX(f.weight / (1 + d.distance)) AS best FROM unnest(");
    qb.push_bind(search.terms.clone());
    qb.push("::text[]) AS t(term) CROSS JOIN (VALUES ");
    for (i, field) in search.fields.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push("(v.")
            .push(field.name())
            .push(", ")
            .push_bind(field.weight())
            .push("::float8)");
    }
    qb.push(") AS f(body, weight)");
    qb.push(" CROSS JOIN LATERAL regexp_split_to_table(lower(f.body), '[^[:alnum:]_]+') AS w(word)");
    qb.push(" CROSS JOIN LATERAL (SELECT CASE WHEN w.word <> '' AND length(w.word) <= ")
        .push(LEVENSHTEIN_MAX_CHARS.to_string())
        .push(" AND length(t.term) <= ")
        .push(LEVENSHTEIN_MAX_CHARS.to_string())
        .push(" AND left(w.word, ")
        .push_bind(prefix)
        .push(") = left(t.term, ")
        .push_bind(prefix)
        .push(") THEN levenshtein_less_equal(w.word, t.term, ")
        .push_bind(max_edits)
        .push(") END AS distance) d WHERE d.distance <= ")
        .push_bind(max_edits);
    qb.push(" GROUP BY t.term) per_term) s ON TRUE");
}

fn sort_expression(key: &SortKey, has_search: bool) -> Option<&'static str> {
    match key.target() {
        SortTarget::Relevance => has_search.then_some("s.score"),
        SortTarget::Field(name) => field_column(name),
    }
}

/// Serialized record field name to column. Text columns compare bytewise
/// so the order matches the in-memory store. Unknown names map to `None`
/// and are left out of the sort, which orders them as all-equal.
fn field_column(name: &str) -> Option<&'static str> {
    let column = match canonical_field(name) {
        "id" => "v.id",
        "title" => "v.title COLLATE \"C\"",
        "description" => "v.description COLLATE \"C\"",
        "video_file.url" => "v.video_file_url COLLATE \"C\"",
        "video_file.public_id" => "v.video_public_id COLLATE \"C\"",
        "thumbnail.url" => "v.thumbnail_url COLLATE \"C\"",
        "thumbnail.public_id" => "v.thumbnail_public_id COLLATE \"C\"",
        "duration" => "v.duration",
        "views" => "v.views",
        "is_published" => "v.is_published",
        "owner_id" => "v.owner_id",
        "created_at" => "v.created_at",
        "updated_at" => "v.updated_at",
        _ => return None,
    };
    Some(column)
}

/// Null is the lowest value: first ascending, last descending.
fn null_ordering(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC NULLS FIRST",
        SortDirection::Desc => "DESC NULLS LAST",
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
