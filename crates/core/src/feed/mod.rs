//! The video feed query engine.
//!
//! A request flows through four pieces, always in this order:
//!
//! ```text
//! FeedParams --(query)--> FeedQuery --(builder)--> FeedPlan
//!            --(engine: count + windowed aggregate)--> FeedPage
//! ```
//!
//! [`service::FeedService`] is the only entry point the HTTP layer uses.
//! Stage precedence inside a plan is fixed: search, match, sort, owner
//! lookup; the engine appends skip/limit last.

pub mod builder;
pub mod engine;
pub mod enrichment;
pub mod page;
pub mod pipeline;
pub mod query;
pub mod service;

pub use builder::{build_feed_plan, FeedPlan};
pub use page::{FeedPage, Page, PageRequest};
pub use pipeline::{Pipeline, Predicate, SortKey, SortTarget, Stage};
pub use query::{FeedParams, FeedQuery, SortDirection, SortSpec};
pub use service::FeedService;
