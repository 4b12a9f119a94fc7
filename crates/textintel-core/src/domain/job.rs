//! Job record: the status document of a submitted job.
//!
//! The payload is stored apart from this record (see `JobStore::put_payload`),
//! so the status TTL never decides whether a queued job still runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::JobId;
use super::state::{JobState, JobStatus, TransitionError};
use super::task::TaskKind;

/// Job record.
///
/// Design:
/// - The queue carries `JobId` only; state lives here, the payload beside it.
/// - State transitions via methods (not direct field access).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub task: TaskKind,
    pub state: JobState,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Failure message (Failed only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub enqueued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn queued(job_id: JobId, task: TaskKind, now: DateTime<Utc>) -> Self {
        Self {
            job_id,
            task,
            state: JobState::Queued,
            result: None,
            error: None,
            enqueued_at: now,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.state.into()
    }

    /// Mark as running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobState::Running)?;
        self.started_at = Some(now);
        Ok(())
    }

    /// Mark as finished with the produced text.
    pub fn finish(&mut self, result: String, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobState::Finished)?;
        self.result = Some(result);
        self.ended_at = Some(now);
        Ok(())
    }

    /// Mark as failed.
    pub fn fail(&mut self, error: String, now: DateTime<Utc>) -> Result<(), TransitionError> {
        self.transition(JobState::Failed)?;
        self.error = Some(error);
        self.ended_at = Some(now);
        Ok(())
    }

    fn transition(&mut self, to: JobState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(to) {
            return Err(TransitionError {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}
