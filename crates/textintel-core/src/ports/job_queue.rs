//! JobQueue port - 配送キュー（Redis または InMemory）
//!
//! JobQueue は job_id のみを流します（状態や payload は JobStore に保存）。

use async_trait::async_trait;
use std::time::Duration;

use super::StoreError;
use crate::domain::JobId;

/// # 設計原則
/// - job_id のみを保持
/// - FIFO: first submitted, first handed out
/// - pop は timeout 付き
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn push(&self, job_id: JobId) -> Result<(), StoreError>;

    /// Wait up to `timeout` for a job id. `Ok(None)` when nothing arrived.
    async fn pop(&self, timeout: Duration) -> Result<Option<JobId>, StoreError>;

    /// Hand a popped id back so it is the next one out.
    async fn requeue(&self, job_id: JobId) -> Result<(), StoreError>;
}
