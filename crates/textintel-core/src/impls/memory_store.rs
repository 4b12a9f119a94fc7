//! InMemoryStore - 開発用・テスト用の共有ストア
//!
//! Result cache + job records in one process. Expiry is read from the
//! injected `Clock`, so tests move time with `FixedClock`.
//!
//! Expired entries are dropped on read, and writes sweep both maps at most
//! once a minute of clock time. Keys that are never read again do not pile up.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::{JobId, JobRecord, TaskPayload};
use crate::fingerprint::CacheKey;
use crate::ports::{Clock, JobStore, ResultCache, StoreError, StoreHealth};

#[derive(Debug, Clone)]
struct Expiring<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V> Expiring<V> {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

const SWEEP_INTERVAL_SECS: i64 = 60;

struct State {
    cache: HashMap<String, Expiring<String>>,
    jobs: HashMap<JobId, Expiring<JobRecord>>,
    // Payloads do not expire; the worker removes them at a terminal state.
    payloads: HashMap<JobId, TaskPayload>,
    last_sweep: DateTime<Utc>,
}

impl State {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            cache: HashMap::new(),
            jobs: HashMap::new(),
            payloads: HashMap::new(),
            last_sweep: now,
        }
    }

    fn sweep_if_due(&mut self, now: DateTime<Utc>) {
        if now - self.last_sweep < chrono::Duration::seconds(SWEEP_INTERVAL_SECS) {
            return;
        }
        self.cache.retain(|_, e| e.is_live(now));
        self.jobs.retain(|_, e| e.is_live(now));
        self.last_sweep = now;
    }
}

pub struct InMemoryStore<C> {
    state: Mutex<State>,
    clock: C,
}

impl<C: Clock> InMemoryStore<C> {
    pub fn new(clock: C) -> Self {
        Self {
            state: Mutex::new(State::new(clock.now())),
            clock,
        }
    }

    fn expiry(&self, ttl: Duration) -> DateTime<Utc> {
        // TTLs are configured in seconds; anything unrepresentable never expires in practice.
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        self.clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Number of live cache entries (for tests and diagnostics).
    pub async fn cached_len(&self) -> usize {
        let now = self.clock.now();
        let state = self.state.lock().await;
        state.cache.values().filter(|e| e.is_live(now)).count()
    }

    /// Entries physically held, live or not.
    #[cfg(test)]
    async fn stored_len(&self) -> usize {
        let state = self.state.lock().await;
        state.cache.len() + state.jobs.len()
    }
}

#[async_trait]
impl<C: Clock> ResultCache for InMemoryStore<C> {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, StoreError> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        match state.cache.get(key.as_str()) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                state.cache.remove(key.as_str());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let entry = Expiring {
            value: value.to_string(),
            expires_at: self.expiry(ttl),
        };
        let mut state = self.state.lock().await;
        state.sweep_if_due(self.clock.now());
        state.cache.insert(key.as_str().to_string(), entry);
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> JobStore for InMemoryStore<C> {
    async fn put(&self, record: &JobRecord, ttl: Duration) -> Result<(), StoreError> {
        let entry = Expiring {
            value: record.clone(),
            expires_at: self.expiry(ttl),
        };
        let mut state = self.state.lock().await;
        state.sweep_if_due(self.clock.now());
        state.jobs.insert(record.job_id, entry);
        Ok(())
    }

    async fn get(&self, job_id: &JobId) -> Result<Option<JobRecord>, StoreError> {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        match state.jobs.get(job_id) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                state.jobs.remove(job_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put_payload(&self, job_id: &JobId, payload: &TaskPayload) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .payloads
            .insert(*job_id, payload.clone());
        Ok(())
    }

    async fn payload(&self, job_id: &JobId) -> Result<Option<TaskPayload>, StoreError> {
        Ok(self.state.lock().await.payloads.get(job_id).cloned())
    }

    async fn remove_payload(&self, job_id: &JobId) -> Result<(), StoreError> {
        self.state.lock().await.payloads.remove(job_id);
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> StoreHealth for InMemoryStore<C> {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
