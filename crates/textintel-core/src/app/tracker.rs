//! JobTracker - ジョブの投入と照会
//!
//! The tracker writes only the payload and the initial `queued` record.
//! Everything after that is the worker's.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{JobId, JobRecord, JobState, JobStatus, TaskPayload};
use crate::error::Error;
use crate::ports::{Clock, IdGenerator, JobQueue, JobStore};

/// Result lookup. `result` is present only for finished jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobView {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

pub struct JobTracker {
    jobs: Arc<dyn JobStore>,
    queue: Arc<dyn JobQueue>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    status_ttl: Duration,
}

impl JobTracker {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        queue: Arc<dyn JobQueue>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        status_ttl: Duration,
    ) -> Self {
        Self {
            jobs,
            queue,
            ids,
            clock,
            status_ttl,
        }
    }

    /// Record the job as queued and enqueue its id. Does not wait for execution.
    pub async fn submit(&self, payload: TaskPayload) -> Result<JobId, Error> {
        payload.validate()?;
        let job_id = self.ids.generate_job_id();
        let task = payload.kind();
        let record = JobRecord::queued(job_id, task, self.clock.now());

        // Both documents first: a worker that pops the id must find them.
        self.jobs.put_payload(&job_id, &payload).await?;
        self.jobs.put(&record, self.status_ttl).await?;
        self.queue.push(job_id).await?;
        info!(%job_id, %task, "job queued");
        Ok(job_id)
    }

    /// Unparseable and unknown ids both resolve to `Unknown`.
    pub async fn status(&self, raw_id: &str) -> Result<JobStatus, Error> {
        Ok(self
            .lookup(raw_id)
            .await?
            .map_or(JobStatus::Unknown, |record| record.status()))
    }

    /// Unlike `status`, an unresolved id is an error here.
    pub async fn result(&self, raw_id: &str) -> Result<JobView, Error> {
        let record = self
            .lookup(raw_id)
            .await?
            .ok_or_else(|| Error::NotFound(raw_id.to_string()))?;

        let result = match record.state {
            JobState::Finished => record.result.clone(),
            JobState::Queued | JobState::Running | JobState::Failed => None,
        };
        Ok(JobView {
            job_id: record.job_id.to_string(),
            status: record.status(),
            result,
        })
    }

    async fn lookup(&self, raw_id: &str) -> Result<Option<JobRecord>, Error> {
        let Ok(job_id) = raw_id.parse::<JobId>() else {
            debug!(raw_id, "job id does not parse");
            return Ok(None);
        };
        Ok(self.jobs.get(&job_id).await?)
    }
}
