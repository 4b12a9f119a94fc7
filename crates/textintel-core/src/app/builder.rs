//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: 全タスクにアダプタ、全ポートに実装
//! - グローバル状態なし: 組み立てた App を注入する

use std::sync::Arc;
use std::time::Duration;

use super::dispatcher::Dispatcher;
use super::executor::InferenceExecutor;
use super::health::HealthCheck;
use super::tracker::JobTracker;
use super::worker_loop::JobWorker;
use crate::config::Ttls;
use crate::domain::TaskKind;
use crate::ports::{
    Clock, IdGenerator, JobQueue, JobStore, ResultCache, StoreHealth, SystemClock, UlidGenerator,
};
use crate::typed::{AdapterRegistry, InferenceAdapter, RegistryError, TaskInput};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let store = Arc::new(RedisStore::open(&config.redis_url, QUEUE_NAME)?);
/// let app = AppBuilder::new()
///     .register::<SummarizeRequest, _>(client.clone())?
///     .register::<QaRequest, _>(client.clone())?
///     .register::<RewriteRequest, _>(client)?
///     .with_store(store.clone())
///     .with_queue(store)
///     .build()?;
/// ```
pub struct AppBuilder {
    registry: AdapterRegistry,
    cache: Option<Arc<dyn ResultCache>>,
    jobs: Option<Arc<dyn JobStore>>,
    health: Option<Arc<dyn StoreHealth>>,
    queue: Option<Arc<dyn JobQueue>>,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn IdGenerator>>,
    ttls: Ttls,
    inference_timeout: Option<Duration>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Missing adapters for tasks: {0:?}. Every task needs exactly one adapter.")]
    MissingAdapters(Vec<TaskKind>),

    #[error("No {0} configured.")]
    MissingPort(&'static str),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            registry: AdapterRegistry::new(),
            cache: None,
            jobs: None,
            health: None,
            queue: None,
            clock: Arc::new(SystemClock),
            ids: None,
            ttls: Ttls::default(),
            inference_timeout: None,
        }
    }

    /// Adapter を登録
    pub fn register<T: TaskInput, A: InferenceAdapter<T> + 'static>(
        mut self,
        adapter: A,
    ) -> Result<Self, RegistryError> {
        self.registry.register::<T, A>(adapter)?;
        Ok(self)
    }

    /// Result cache + job records + health from one backing store.
    pub fn with_store<S>(mut self, store: Arc<S>) -> Self
    where
        S: ResultCache + JobStore + StoreHealth + 'static,
    {
        self.cache = Some(store.clone());
        self.jobs = Some(store.clone());
        self.health = Some(store);
        self
    }

    pub fn with_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Defaults to ULIDs stamped by the configured clock.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_ttls(mut self, ttls: Ttls) -> Self {
        self.ttls = ttls;
        self
    }

    pub fn with_inference_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inference_timeout = timeout;
        self
    }

    /// # 検証
    /// - 全 TaskKind にアダプタが登録されているか
    /// - store / queue が設定されているか
    pub fn build(self) -> Result<App, BuildError> {
        let missing = self.registry.missing_kinds();
        if !missing.is_empty() {
            return Err(BuildError::MissingAdapters(missing));
        }
        let cache = self.cache.ok_or(BuildError::MissingPort("store"))?;
        let jobs = self.jobs.ok_or(BuildError::MissingPort("store"))?;
        let health = self.health.ok_or(BuildError::MissingPort("store"))?;
        let queue = self.queue.ok_or(BuildError::MissingPort("job queue"))?;
        let clock = self.clock;
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(Arc::clone(&clock))),
        };

        let executor = Arc::new(InferenceExecutor::new(
            Arc::new(self.registry),
            self.inference_timeout,
        ));
        let dispatcher = Dispatcher::new(Arc::clone(&executor), cache, self.ttls.cache);
        let tracker = JobTracker::new(
            Arc::clone(&jobs),
            Arc::clone(&queue),
            ids,
            Arc::clone(&clock),
            self.ttls.job_status,
        );
        let worker = JobWorker::new(jobs, queue, executor, clock, self.ttls);

        Ok(App {
            dispatcher: Arc::new(dispatcher),
            tracker: Arc::new(tracker),
            worker: Arc::new(worker),
            health: Arc::new(HealthCheck::new(health)),
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wired application. Cheap to clone; every part is shared.
#[derive(Clone)]
pub struct App {
    pub dispatcher: Arc<Dispatcher>,
    pub tracker: Arc<JobTracker>,
    pub worker: Arc<JobWorker>,
    pub health: Arc<HealthCheck>,
}
