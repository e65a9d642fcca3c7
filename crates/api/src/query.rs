//! Shared query parameter types for API handlers.

use serde::Deserialize;
use vyom_core::feed::query::{clamp_page, clamp_page_size};
use vyom_core::feed::PageRequest;

/// Page-number pagination (`?page=&limit=`), clamped the same way as the
/// video feed: non-positive or missing values fall back to the defaults
/// and `limit` is capped.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    #[serde(alias = "page_size", alias = "pageSize")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(clamp_page(self.page), clamp_page_size(self.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_like_the_feed() {
        let req = PaginationParams {
            page: Some(0),
            limit: Some(500),
        }
        .to_request();
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 50);

        let req = PaginationParams::default().to_request();
        assert_eq!(req.page_size(), 10);
    }
}
