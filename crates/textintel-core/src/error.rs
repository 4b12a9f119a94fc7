use thiserror::Error;

use crate::domain::{InferenceError, ValidationError};
use crate::ports::StoreError;

/// Error surfaced by the dispatch and job-tracking operations.
///
/// The HTTP layer maps each variant to one status code; see `kind()`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("job not found: {0}")]
    NotFound(String),
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Inference,
    Timeout,
    StoreUnavailable,
    NotFound,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Inference(InferenceError::Timeout(_)) => ErrorKind::Timeout,
            Error::Inference(_) => ErrorKind::Inference,
            Error::Store(_) => ErrorKind::StoreUnavailable,
            Error::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
