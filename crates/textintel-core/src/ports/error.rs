use thiserror::Error;

/// Failure talking to the shared store (cache, job records or queue).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record under {key}: {reason}")]
    Corrupt { key: String, reason: String },
}
