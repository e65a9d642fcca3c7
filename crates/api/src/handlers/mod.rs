//! HTTP handlers, one module per resource.

pub mod tweet;
pub mod video;
