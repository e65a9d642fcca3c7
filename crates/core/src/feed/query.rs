//! Raw feed parameters and their validated form.

use serde::Deserialize;

use crate::error::CoreError;
use crate::ids::parse_id;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Page used when none (or a non-positive one) is requested.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when none (or a non-positive one) is requested.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Hard ceiling on page size; larger requests are clamped, not rejected.
pub const MAX_PAGE_SIZE: u64 = 50;

/// Field the feed sorts by when nothing else applies.
pub const DEFAULT_SORT_FIELD: &str = "created_at";

// ---------------------------------------------------------------------------
// Raw parameters
// ---------------------------------------------------------------------------

/// Feed parameters as they arrive on the query string.
///
/// Both snake_case and the legacy camelCase spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedParams {
    pub page: Option<i64>,
    #[serde(alias = "page_size", alias = "pageSize")]
    pub limit: Option<i64>,
    pub query: Option<String>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(alias = "sortType")]
    pub sort_type: Option<String>,
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Sort specification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `"asc"` (any case) is ascending; anything else, including absence,
    /// is descending.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An explicit caller-requested sort. The field name is passed through
/// to the store unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

// ---------------------------------------------------------------------------
// Validated query
// ---------------------------------------------------------------------------

/// A validated, normalized feed request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedQuery {
    pub search: Option<String>,
    pub owner_id: Option<DbId>,
    pub sort: Option<SortSpec>,
    pub page: u64,
    pub page_size: u64,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            search: None,
            owner_id: None,
            sort: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl FeedQuery {
    /// Validate raw parameters.
    ///
    /// The only hard failure is a malformed `user_id`, which raises
    /// [`CoreError::InvalidReference`]. Everything else is normalized:
    /// blank strings become `None`, page and page size are clamped.
    pub fn from_params(params: &FeedParams) -> Result<Self, CoreError> {
        let owner_id = non_blank(params.user_id.as_deref())
            .map(|raw| parse_id("user_id", raw))
            .transpose()?;

        let sort = non_blank(params.sort_by.as_deref()).map(|field| SortSpec {
            field: field.to_string(),
            direction: SortDirection::from_param(params.sort_type.as_deref()),
        });

        Ok(Self {
            search: non_blank(params.query.as_deref()).map(str::to_string),
            owner_id,
            sort,
            page: clamp_page(params.page),
            page_size: clamp_page_size(params.limit),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Non-positive or missing pages become [`DEFAULT_PAGE`].
pub fn clamp_page(page: Option<i64>) -> u64 {
    match page {
        Some(p) if p >= 1 => p as u64,
        _ => DEFAULT_PAGE,
    }
}

/// Non-positive or missing sizes become [`DEFAULT_PAGE_SIZE`]; sizes above
/// [`MAX_PAGE_SIZE`] are clamped down to it.
pub fn clamp_page_size(size: Option<i64>) -> u64 {
    match size {
        Some(s) if s >= 1 => (s as u64).min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
