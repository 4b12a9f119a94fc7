//! RedisStore - 本番用の共有ストア
//!
//! One handle implements every store port:
//! - result cache: `SET key value EX ttl` / `GET key`
//! - job records: JSON under `job:{job_id}` with `EX ttl`
//! - job payloads: JSON under `job:{job_id}:payload`, no expiry, `DEL` at a terminal state
//! - queue: `LPUSH` / `RPOP` on `queue:{name}` (FIFO); `RPUSH` hands an id back to the head
//!
//! The connection is opened lazily so the service can start (and report an
//! unhealthy store) while Redis is down. `ConnectionManager` reconnects on its
//! own after that.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::{JobId, JobRecord, TaskPayload};
use crate::fingerprint::CacheKey;
use crate::ports::{JobQueue, JobStore, ResultCache, StoreError, StoreHealth};

const POP_POLL_INTERVAL: Duration = Duration::from_millis(100);

// Fail fast when Redis is down so /health answers promptly.
const CONNECT_RETRIES: usize = 1;
const CONNECT_BACKOFF_BASE: u64 = 2;
const CONNECT_BACKOFF_FACTOR_MS: u64 = 100;
// A blackholed host never refuses; give up instead of hanging /health.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

pub struct RedisStore {
    client: redis::Client,
    conn: OnceCell<redis::aio::ConnectionManager>,
    queue_key: String,
    connect_timeout: Duration,
}

impl RedisStore {
    /// Parse the URL only; no connection is made until the first command.
    pub fn open(url: &str, queue_name: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            conn: OnceCell::new(),
            queue_key: format!("queue:{queue_name}"),
            connect_timeout: CONNECT_TIMEOUT,
        })
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    fn job_key(job_id: &JobId) -> String {
        format!("job:{job_id}")
    }

    fn payload_key(job_id: &JobId) -> String {
        format!("job:{job_id}:payload")
    }

    async fn connection(&self) -> Result<redis::aio::ConnectionManager, StoreError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                debug!("connecting to redis");
                let config = redis::aio::ConnectionManagerConfig::new()
                    .set_exponent_base(CONNECT_BACKOFF_BASE)
                    .set_factor(CONNECT_BACKOFF_FACTOR_MS)
                    .set_number_of_retries(CONNECT_RETRIES)
                    .set_connection_timeout(self.connect_timeout);
                redis::aio::ConnectionManager::new_with_config(self.client.clone(), config).await
            })
            .await?;
        Ok(conn.clone())
    }

    async fn query<T: redis::FromRedisValue>(&self, cmd: redis::Cmd) -> Result<T, StoreError> {
        let mut conn = self.connection().await?;
        Ok(cmd.query_async(&mut conn).await?)
    }

    async fn set_ex_string(&self, key: &str, val: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(val).arg("EX").arg(ttl.as_secs().max(1));
        self.query(cmd).await
    }

    async fn set_string(&self, key: &str, val: &str) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(val);
        self.query(cmd).await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.query(cmd).await
    }
}

#[async_trait]
impl ResultCache for RedisStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, StoreError> {
        self.get_string(key.as_str()).await
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.set_ex_string(key.as_str(), value, ttl).await
    }
}

#[async_trait]
impl JobStore for RedisStore {
    async fn put(&self, record: &JobRecord, ttl: Duration) -> Result<(), StoreError> {
        let key = Self::job_key(&record.job_id);
        let json = serde_json::to_string(record).map_err(|e| StoreError::Corrupt {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.set_ex_string(&key, &json, ttl).await
    }

    async fn get(&self, job_id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        let key = Self::job_key(job_id);
        let Some(json) = self.get_string(&key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key,
                reason: e.to_string(),
            })
    }

    async fn put_payload(&self, job_id: &JobId, payload: &TaskPayload) -> Result<(), StoreError> {
        let key = Self::payload_key(job_id);
        let json = serde_json::to_string(payload).map_err(|e| StoreError::Corrupt {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        self.set_string(&key, &json).await
    }

    async fn payload(&self, job_id: &JobId) -> Result<Option<TaskPayload>, StoreError> {
        let key = Self::payload_key(job_id);
        let Some(json) = self.get_string(&key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key,
                reason: e.to_string(),
            })
    }

    async fn remove_payload(&self, job_id: &JobId) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(Self::payload_key(job_id));
        let _removed: u64 = self.query(cmd).await?;
        Ok(())
    }
}

#[async_trait]
impl JobQueue for RedisStore {
    async fn push(&self, job_id: JobId) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("LPUSH");
        cmd.arg(&self.queue_key).arg(job_id.to_string());
        let _len: u64 = self.query(cmd).await?;
        Ok(())
    }

    // RPOP takes from the right, so RPUSH puts the id back in front.
    async fn requeue(&self, job_id: JobId) -> Result<(), StoreError> {
        let mut cmd = redis::cmd("RPUSH");
        cmd.arg(&self.queue_key).arg(job_id.to_string());
        let _len: u64 = self.query(cmd).await?;
        Ok(())
    }

    // Polls with RPOP instead of BRPOP: a blocking command would stall every
    // other request multiplexed on the shared connection.
    async fn pop(&self, timeout: Duration) -> Result<Option<JobId>, StoreError> {
        let deadline = Instant::now() + timeout;
        loop {
            let mut cmd = redis::cmd("RPOP");
            cmd.arg(&self.queue_key);
            let raw: Option<String> = self.query(cmd).await?;
            if let Some(raw) = raw {
                return raw.parse().map(Some).map_err(|_| StoreError::Corrupt {
                    key: self.queue_key.clone(),
                    reason: format!("not a job id: {raw:?}"),
                });
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POP_POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}

#[async_trait]
impl StoreHealth for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let pong: String = self.query(redis::cmd("PING")).await?;
        debug!(%pong, "redis ping");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn open_rejects_malformed_urls() {
        assert!(RedisStore::open("not a url", "genai").is_err());
    }

    #[test]
    fn open_does_not_connect() {
        // Nothing listens on port 1; opening must still succeed.
        let store = RedisStore::open("redis://127.0.0.1:1/0", "genai").unwrap();
        assert_eq!(store.queue_key, "queue:genai");
    }

    #[test]
    fn job_keys_embed_the_display_form() {
        let job_id = JobId::from_ulid(Ulid::new());
        assert_eq!(RedisStore::job_key(&job_id), format!("job:{job_id}"));
        assert_eq!(
            RedisStore::payload_key(&job_id),
            format!("job:{job_id}:payload")
        );
    }

    #[tokio::test]
    async fn unreachable_redis_is_reported_as_unavailable() {
        let store = RedisStore::open("redis://127.0.0.1:1/0", "genai").unwrap();
        let err = store.ping().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn silent_host_fails_within_the_connect_timeout() {
        // Non-routable: the SYN is dropped rather than refused.
        let store = RedisStore::open("redis://10.255.255.1:6379/0", "genai")
            .unwrap()
            .with_connect_timeout(Duration::from_millis(200));
        let outcome = tokio::time::timeout(Duration::from_secs(5), store.ping()).await;
        assert!(matches!(outcome, Ok(Err(StoreError::Unavailable(_)))));
    }
}
