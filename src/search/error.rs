use reqwest::StatusCode;
use rocket_db_pools::sqlx;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the job board. These never leave the job source; they
/// are logged and the fetch degrades to an empty posting list.
#[derive(Debug, Error)]
pub enum JobSourceError {
    #[error("job source HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("job source returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode job source payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("job source request timed out after {0:?}")]
    Timeout(Duration),
}

/// Failures from a single keyword extraction batch.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("keyword service HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("keyword service returned status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("failed to decode keyword response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("keyword request timed out after {0:?}")]
    Timeout(Duration),
    #[error("keyword response count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("favorites store error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors that abort a search request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no active session")]
    Unauthorized,
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error(transparent)]
    Favorites(#[from] FavoritesError),
}

/// Outcome classification used by the retry loop.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

fn status_is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

impl Retryable for JobSourceError {
    fn is_retryable(&self) -> bool {
        match self {
            JobSourceError::Http(_) | JobSourceError::Timeout(_) => true,
            JobSourceError::Status { status, .. } => status_is_retryable(*status),
            JobSourceError::Decode(_) => false,
        }
    }
}

impl Retryable for ExtractionError {
    fn is_retryable(&self) -> bool {
        match self {
            ExtractionError::Http(_) | ExtractionError::Timeout(_) => true,
            ExtractionError::Status { status, .. } => status_is_retryable(*status),
            ExtractionError::Decode(_)
            | ExtractionError::CountMismatch { .. } => false,
        }
    }
}
