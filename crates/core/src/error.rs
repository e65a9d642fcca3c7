use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A caller-supplied reference is not a well-formed identifier.
    #[error("Invalid reference for '{field}': '{value}' is not a well-formed id")]
    InvalidReference { field: &'static str, value: String },

    /// The document store could not serve the request. Retryable.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The external media store rejected or failed an operation.
    #[error("Media store unavailable: {0}")]
    MediaUnavailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::MediaUnavailable(_))
    }
}
