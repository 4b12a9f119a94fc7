//! Domain model (task descriptors, job records, states, errors).

pub mod errors;
pub mod ids;
pub mod job;
pub mod state;
pub mod task;

pub use self::errors::{InferenceError, ValidationError};
pub use self::ids::{JobId, ParseJobIdError};
pub use self::job::JobRecord;
pub use self::state::{JobState, JobStatus, TransitionError};
pub use self::task::{
    QaRequest, RewriteRequest, SummarizeRequest, TaskKind, TaskPayload, Tone,
    DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH,
};
