//! JobWorker / WorkerGroup - ジョブ実行ループ
//!
//! # フロー
//! 1. JobQueue::pop() で job_id 取得（timeout 付き）
//! 2. JobStore::payload() で payload 取得（無ければ終了済みとして skip）
//! 3. status レコードを読む（TTL 切れなら queued で作り直す）
//! 4. running を書く
//! 5. InferenceExecutor::process()（キャッシュは使わない）
//! 6. finished + result / failed + error を result TTL で書き、payload を消す
//!
//! ストアエラーで 2-4 が失敗したら job_id をキューの先頭に戻す。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::executor::InferenceExecutor;
use crate::config::Ttls;
use crate::domain::{JobId, JobRecord, TaskPayload};
use crate::ports::{Clock, JobQueue, JobStore, StoreError};

const POP_TIMEOUT: Duration = Duration::from_secs(1);
const STORE_BACKOFF: Duration = Duration::from_secs(1);

/// What one iteration of the loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing arrived before the pop timeout.
    Idle,
    /// The id was dropped: already done, or not in a startable state.
    Skipped(JobId),
    Finished(JobId),
    Failed(JobId),
}

pub struct JobWorker {
    jobs: Arc<dyn JobStore>,
    queue: Arc<dyn JobQueue>,
    executor: Arc<InferenceExecutor>,
    clock: Arc<dyn Clock>,
    ttls: Ttls,
    pop_timeout: Duration,
}

impl JobWorker {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        queue: Arc<dyn JobQueue>,
        executor: Arc<InferenceExecutor>,
        clock: Arc<dyn Clock>,
        ttls: Ttls,
    ) -> Self {
        Self {
            jobs,
            queue,
            executor,
            clock,
            ttls,
            pop_timeout: POP_TIMEOUT,
        }
    }

    /// Also bounds how long a worker takes to notice a shutdown request.
    pub fn with_pop_timeout(mut self, pop_timeout: Duration) -> Self {
        self.pop_timeout = pop_timeout;
        self
    }

    /// Pop one id and run it to a terminal state.
    pub async fn run_once(&self) -> Result<Tick, StoreError> {
        let Some(job_id) = self.queue.pop(self.pop_timeout).await? else {
            return Ok(Tick::Idle);
        };

        let (payload, record) = match self.claim(job_id).await {
            Ok(Some(claimed)) => claimed,
            Ok(None) => return Ok(Tick::Skipped(job_id)),
            Err(e) => {
                // Nothing ran yet: put the id back where it was.
                if let Err(requeue_err) = self.queue.requeue(job_id).await {
                    error!(%job_id, error = %requeue_err, "could not requeue job");
                }
                return Err(e);
            }
        };
        self.execute(payload, record).await
    }

    /// Load the job and mark it running. `None` when there is nothing to run.
    async fn claim(&self, job_id: JobId) -> Result<Option<(TaskPayload, JobRecord)>, StoreError> {
        let Some(payload) = self.jobs.payload(&job_id).await? else {
            warn!(%job_id, "job payload missing (already done?), skipping");
            return Ok(None);
        };

        let mut record = match self.jobs.get(&job_id).await? {
            Some(record) => record,
            None => {
                debug!(%job_id, "status record expired while queued");
                JobRecord::queued(job_id, payload.kind(), self.clock.now())
            }
        };

        if let Err(e) = record.start(self.clock.now()) {
            warn!(%job_id, error = %e, "job not startable, skipping");
            return Ok(None);
        }
        self.jobs.put(&record, self.ttls.job_status).await?;
        info!(%job_id, task = %record.task, "job running");
        Ok(Some((payload, record)))
    }

    async fn execute(&self, payload: TaskPayload, mut record: JobRecord) -> Result<Tick, StoreError> {
        let job_id = record.job_id;
        let outcome = self.executor.process(&payload).await;
        let now = self.clock.now();
        let (transition, tick) = match outcome {
            Ok(result) => (record.finish(result, now), Tick::Finished(job_id)),
            Err(err) => {
                warn!(%job_id, error = %err, "job failed");
                (record.fail(err.to_string(), now), Tick::Failed(job_id))
            }
        };
        if let Err(e) = transition {
            warn!(%job_id, error = %e, "illegal job transition");
            return Ok(Tick::Skipped(job_id));
        }

        self.jobs.put(&record, self.ttls.job_result).await?;
        // A leftover payload only means a redelivered id is skipped as not startable.
        if let Err(e) = self.jobs.remove_payload(&job_id).await {
            warn!(%job_id, error = %e, "could not remove job payload");
        }
        info!(%job_id, state = ?record.state, "job done");
        Ok(tick)
    }
}

/// Worker group handle.
/// - `request_shutdown()` で新規ジョブの取得を止める
/// - 実行中のジョブは最後まで走る
/// - `shutdown_and_join()` で全ワーカーの終了を待てる
pub struct WorkerGroup {
    shutdown_tx: watch::Sender<bool>,
    joins: Vec<JoinHandle<()>>,
}

impl WorkerGroup {
    /// Spawn `n` workers sharing one `JobWorker`.
    pub fn spawn(n: usize, worker: Arc<JobWorker>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut joins = Vec::with_capacity(n);
        for worker_id in 0..n {
            let w = Arc::clone(&worker);
            let mut rx = shutdown_rx.clone();

            let join = tokio::spawn(async move {
                worker_loop(worker_id, w, &mut rx).await;
            });
            joins.push(join);
        }
        info!(workers = n, "worker group started");

        Self { shutdown_tx, joins }
    }

    pub fn request_shutdown(&self) {
        // receivers may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        for j in self.joins {
            if let Err(e) = j.await {
                error!(error = %e, "worker task panicked");
            }
        }
    }
}

async fn worker_loop(worker_id: usize, worker: Arc<JobWorker>, shutdown_rx: &mut watch::Receiver<bool>) {
    loop {
        let requested = *shutdown_rx.borrow();
        // group handle dropped -> has_changed() is Err
        if requested || shutdown_rx.has_changed().is_err() {
            break;
        }

        // pop は select で中断しない（取り出した id を失う）。pop timeout ごとに shutdown を見る
        if let Err(e) = worker.run_once().await {
            error!(worker_id, error = %e, "store error, backing off");
            tokio::select! {
                _ = shutdown_rx.changed() => {}
                _ = tokio::time::sleep(STORE_BACKOFF) => {}
            }
        }
    }
    info!(worker_id, "worker stopped");
}
