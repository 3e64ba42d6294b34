use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type shared by the forecasting services.
///
/// Expected data-quality conditions (too few points, short span) are never
/// surfaced through this type — they travel inside
/// [`crate::services::validation::ValidationResult`] so that callers always
/// receive a structured response. `ServiceError` is reserved for the paths
/// where no structured fallback exists.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ServiceError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}
