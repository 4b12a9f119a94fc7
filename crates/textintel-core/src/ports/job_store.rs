//! JobStore port - ジョブレコードの保存先
//!
//! Two documents per job:
//! - status record: written by the API as `queued`, then by the worker. Expires with its TTL.
//! - payload: written once at submit, no TTL, removed when the job reaches a terminal state.
//!
//! Only the payload decides whether a popped id still runs.

use async_trait::async_trait;
use std::time::Duration;

use super::StoreError;
use crate::domain::{JobId, JobRecord, TaskPayload};

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Write the whole record, replacing what was there and resetting its TTL.
    async fn put(&self, record: &JobRecord, ttl: Duration) -> Result<(), StoreError>;

    /// `None` when there is no record (never written, expired or evicted).
    async fn get(&self, job_id: &JobId) -> Result<Option<JobRecord>, StoreError>;

    async fn put_payload(&self, job_id: &JobId, payload: &TaskPayload) -> Result<(), StoreError>;

    /// `None` once the job has finished or failed.
    async fn payload(&self, job_id: &JobId) -> Result<Option<TaskPayload>, StoreError>;

    async fn remove_payload(&self, job_id: &JobId) -> Result<(), StoreError>;
}
