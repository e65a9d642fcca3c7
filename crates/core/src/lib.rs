//! Domain layer for the video-sharing backend.
//!
//! Holds everything that does not touch the network or the database:
//! identifiers, domain errors, the record model, the feed query engine,
//! search scoring, and the store/media traits that the persistence and
//! HTTP crates implement.

pub mod error;
pub mod feed;
pub mod ids;
pub mod media;
pub mod model;
pub mod publishing;
pub mod search;
pub mod store;
pub mod types;
