//! Pipeline stages understood by every [`DocumentStore`](crate::store::DocumentStore).

use crate::feed::query::SortDirection;
use crate::search::{FuzzyOptions, WEIGHT_DESCRIPTION, WEIGHT_TITLE};
use crate::types::DbId;

/// Text fields the search stage scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Description,
}

impl SearchField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            Self::Title => WEIGHT_TITLE,
            Self::Description => WEIGHT_DESCRIPTION,
        }
    }
}

/// Fuzzy full-text search. Records with no matching term are dropped;
/// survivors carry a relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStage {
    /// The user's original input, kept for logging.
    pub text: String,
    /// Normalized terms (see [`crate::search::search_terms`]).
    pub terms: Vec<String>,
    pub fields: Vec<SearchField>,
    pub fuzzy: FuzzyOptions,
}

/// A single equality predicate. All predicates of a match stage must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    OwnerEquals(DbId),
    PublishedEquals(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortTarget<'a> {
    /// The score attached by a preceding search stage.
    Relevance,
    /// A record field by serialized name, resolved opaquely by the store.
    Field(&'a str),
}

/// One key of a compound sort. Earlier keys take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Relevance(SortDirection),
    Field { name: String, direction: SortDirection },
}

impl SortKey {
    pub fn field(name: impl Into<String>, direction: SortDirection) -> Self {
        Self::Field {
            name: name.into(),
            direction,
        }
    }

    pub fn target(&self) -> SortTarget<'_> {
        match self {
            Self::Relevance(_) => SortTarget::Relevance,
            Self::Field { name, .. } => SortTarget::Field(name),
        }
    }

    pub fn direction(&self) -> SortDirection {
        match self {
            Self::Relevance(direction) | Self::Field { direction, .. } => *direction,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Search(SearchStage),
    Match(Vec<Predicate>),
    Sort(Vec<SortKey>),
    /// Join each record with its owner's projection (null when missing).
    LookupOwner,
    Skip(u64),
    Limit(u64),
}

impl Stage {
    /// Position in the canonical stage order. Stores that cannot execute
    /// arbitrary orderings reject pipelines whose ranks decrease.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Search(_) => 0,
            Self::Match(_) => 1,
            Self::Sort(_) => 2,
            Self::LookupOwner => 3,
            Self::Skip(_) => 4,
            Self::Limit(_) => 5,
        }
    }

    /// Whether the stage changes which records match (as opposed to their
    /// order, shape, or window).
    pub fn is_filtering(&self) -> bool {
        matches!(self, Self::Search(_) | Self::Match(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Search(_) => "search",
            Self::Match(_) => "match",
            Self::Sort(_) => "sort",
            Self::LookupOwner => "lookup_owner",
            Self::Skip(_) => "skip",
            Self::Limit(_) => "limit",
        }
    }
}

/// An ordered sequence of stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Stage) -> &mut Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Only the stages that decide membership; this is what a count runs.
    pub fn filtering_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|s| s.is_filtering())
            .cloned()
            .collect()
    }

    /// The full pipeline followed by a skip/limit window.
    pub fn windowed(&self, offset: u64, limit: u64) -> Vec<Stage> {
        let mut stages = self.stages.clone();
        stages.push(Stage::Skip(offset));
        stages.push(Stage::Limit(limit));
        stages
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }
}

/// Verify stages appear in canonical order (ranks never decrease).
pub fn is_canonical_order(stages: &[Stage]) -> bool {
    stages.windows(2).all(|w| w[0].rank() <= w[1].rank())
}
