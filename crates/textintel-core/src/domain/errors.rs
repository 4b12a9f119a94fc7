//! Errors - エラー型と分類
//!
//! - `ValidationError`: the request is wrong; reported before any work.
//! - `InferenceError`: the adapter failed; never cached.

use std::time::Duration;

use super::task::TaskKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("invalid length bounds: min_length={min_length}, max_length={max_length}")]
    LengthBounds { min_length: u32, max_length: u32 },

    #[error("malformed payload: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("no adapter registered for task {0}")]
    AdapterMissing(TaskKind),

    #[error("adapter for {expected} was handed a {actual} payload")]
    PayloadMismatch { expected: TaskKind, actual: TaskKind },

    #[error("inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("inference backend failed: {0}")]
    Backend(String),

    #[error("unexpected inference response: {0}")]
    MalformedResponse(String),
}
