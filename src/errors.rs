use thiserror::Error;

use crate::id::MoodEntryId;
use crate::validation::ValidationErrors;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a request body that failed validation.
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    /// Represents a malformed identifier.
    #[error("invalid ID: {0}")]
    InvalidId(String),

    /// Represents a well-formed identifier with no matching entry.
    #[error("no mood entry with ID {0}")]
    NonExistentId(MoodEntryId),

    /// Represents a search without a query.
    #[error("search query must not be empty")]
    MissingQuery,

    /// Represents a `limit` parameter that is not a count we accept.
    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    /// Represents a query string that could not be decoded.
    #[error("invalid query string")]
    MalformedQuery,

    /// Represents an SQL error.
    #[error("database error: {source}")]
    Sqlx { source: sqlx::Error },

    /// Represents a failure of the mood-analysis service.
    #[error("mood analysis failed: {source}")]
    Analysis { source: ClientError },

    /// Represents a failure of the music catalog.
    #[error("music catalog request failed: {source}")]
    Catalog { source: ClientError },
}

impl From<sqlx::Error> for BackendError {
    fn from(source: sqlx::Error) -> Self {
        BackendError::Sqlx { source }
    }
}

/// Enumerates errors returned by the clients of external services.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Represents a failure to reach the service or read its response.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Represents a non-success status returned by the service.
    #[error("service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Represents a response that could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
