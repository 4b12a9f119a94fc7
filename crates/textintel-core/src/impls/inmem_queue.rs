//! InMemoryJobQueue - 開発用の配送キュー
//!
//! # 学習ポイント
//! - tokio::sync::Notify による待機付き pop
//! - ロックは push/pop の中で完結（ロック跨ぎ await しない）

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::domain::JobId;
use crate::ports::{JobQueue, StoreError};

/// InMemoryJobQueue は開発用の配送キュー
///
/// # 実装詳細
/// - VecDeque<JobId> を Mutex で保護
/// - Notify で push 時に待機中の worker を起こす
///
/// # 使用例
/// ```ignore
/// let queue = InMemoryJobQueue::new();
/// queue.push(job_id).await?;
/// let next = queue.pop(Duration::from_secs(5)).await?;
/// ```
#[derive(Default)]
pub struct InMemoryJobQueue {
    items: Mutex<VecDeque<JobId>>,
    notify: Notify,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn push(&self, job_id: JobId) -> Result<(), StoreError> {
        self.items.lock().await.push_back(job_id);
        // 待機中の worker に通知（いなければ permit が残る）
        self.notify.notify_one();
        Ok(())
    }

    async fn requeue(&self, job_id: JobId) -> Result<(), StoreError> {
        self.items.lock().await.push_front(job_id);
        self.notify.notify_one();
        Ok(())
    }

    async fn pop(&self, timeout: Duration) -> Result<Option<JobId>, StoreError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(job_id) = self.items.lock().await.pop_front() {
                return Ok(Some(job_id));
            }
            if tokio::time::timeout_at(deadline, self.notify.notified())
                .await
                .is_err()
            {
                // One last look: a push may have landed right at the deadline.
                return Ok(self.items.lock().await.pop_front());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use ulid::Ulid;

    fn new_id() -> JobId {
        JobId::from_ulid(Ulid::new())
    }

    #[tokio::test]
    async fn test_push_pop_fifo() {
        let queue = InMemoryJobQueue::new();
        let (a, b) = (new_id(), new_id());
        queue.push(a).await.unwrap();
        queue.push(b).await.unwrap();

        assert_eq!(queue.pop(Duration::from_secs(1)).await.unwrap(), Some(a));
        assert_eq!(queue.pop(Duration::from_secs(1)).await.unwrap(), Some(b));
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_requeue_goes_to_the_head() {
        let queue = InMemoryJobQueue::new();
        let (a, b) = (new_id(), new_id());
        queue.push(a).await.unwrap();
        queue.push(b).await.unwrap();

        let popped = queue.pop(Duration::ZERO).await.unwrap().unwrap();
        queue.requeue(popped).await.unwrap();

        assert_eq!(queue.pop(Duration::ZERO).await.unwrap(), Some(a));
        assert_eq!(queue.pop(Duration::ZERO).await.unwrap(), Some(b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_timeout() {
        let queue = InMemoryJobQueue::new();
        let start = Instant::now();
        let popped = queue.pop(Duration::from_millis(500)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(popped, None);
    }

    #[tokio::test]
    async fn test_push_wakes_pop() {
        let queue = Arc::new(InMemoryJobQueue::new());
        let job_id = new_id();

        let waiter = tokio::spawn({
            let queue = queue.clone();
            async move { queue.pop(Duration::from_secs(5)).await.unwrap() }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        queue.push(job_id).await.unwrap();

        assert_eq!(waiter.await.unwrap(), Some(job_id));
    }
}
