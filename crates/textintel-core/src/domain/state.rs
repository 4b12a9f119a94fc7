//! Job state machine.

use serde::{Deserialize, Serialize};

/// Stored job state.
///
/// State transitions:
/// - Queued -> Running -> Finished
/// - Queued -> Running -> Failed
///
/// Only the worker moves a job past `Queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Running,
    Finished,
    Failed,
}

impl JobState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Finished | JobState::Failed)
    }

    pub fn can_transition_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Queued, JobState::Running)
                | (JobState::Running, JobState::Finished)
                | (JobState::Running, JobState::Failed)
        )
    }
}

/// Status reported to clients.
///
/// `Unknown` is never stored: it is what a lookup yields when the store has no
/// record, whether the job expired or never existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed,
    Unknown,
}

impl From<JobState> for JobStatus {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Queued => JobStatus::Queued,
            JobState::Running => JobStatus::Running,
            JobState::Finished => JobStatus::Finished,
            JobState::Failed => JobStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal job transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: JobState,
    pub to: JobState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::start(JobState::Queued, JobState::Running)]
    #[case::finish(JobState::Running, JobState::Finished)]
    #[case::fail(JobState::Running, JobState::Failed)]
    fn allowed_transitions(#[case] from: JobState, #[case] to: JobState) {
        assert!(from.can_transition_to(to));
    }

    #[rstest]
    #[case::skip_running(JobState::Queued, JobState::Finished)]
    #[case::restart(JobState::Running, JobState::Running)]
    #[case::requeue(JobState::Running, JobState::Queued)]
    #[case::revive_finished(JobState::Finished, JobState::Running)]
    #[case::flip_terminal(JobState::Finished, JobState::Failed)]
    #[case::revive_failed(JobState::Failed, JobState::Queued)]
    fn rejected_transitions(#[case] from: JobState, #[case] to: JobState) {
        assert!(!from.can_transition_to(to));
    }

    #[test]
    fn terminal_states() {
        assert!(JobState::Finished.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Running.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        let s = serde_json::to_string(&JobStatus::Unknown).unwrap();
        assert_eq!(s, "\"unknown\"");
        let s = serde_json::to_string(&JobStatus::from(JobState::Finished)).unwrap();
        assert_eq!(s, "\"finished\"");
    }
}
