//! Identifier validation.
//!
//! Every id that arrives as raw text (query strings, path segments) goes
//! through here before it reaches a store, so malformed references are
//! rejected without touching the database.

use crate::error::CoreError;
use crate::types::DbId;

/// Returns `true` if `value` parses as a record identifier.
pub fn is_well_formed_id(value: &str) -> bool {
    DbId::try_parse(value.trim()).is_ok()
}

/// Parse a raw identifier, naming the offending `field` on failure.
pub fn parse_id(field: &'static str, value: &str) -> Result<DbId, CoreError> {
    DbId::try_parse(value.trim()).map_err(|_| CoreError::InvalidReference {
        field,
        value: value.to_string(),
    })
}

/// Generate a new time-ordered identifier.
pub fn new_id() -> DbId {
    uuid::Uuid::now_v7()
}
