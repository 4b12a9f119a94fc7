//! Dispatcher - 同期パス（cache-first）
//!
//! validate → cache key → hit: return / miss: infer → set(ttl) → return.
//! Exactly one cache write per miss, none per hit, none on failure.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::executor::InferenceExecutor;
use crate::domain::TaskPayload;
use crate::error::Error;
use crate::fingerprint::Fingerprinted;
use crate::ports::ResultCache;

/// Outcome of one synchronous dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub result: String,
    pub cached: bool,
}

pub struct Dispatcher {
    executor: Arc<InferenceExecutor>,
    cache: Arc<dyn ResultCache>,
    ttl: Duration,
}

impl Dispatcher {
    pub fn new(executor: Arc<InferenceExecutor>, cache: Arc<dyn ResultCache>, ttl: Duration) -> Self {
        Self {
            executor,
            cache,
            ttl,
        }
    }

    pub async fn handle(&self, payload: &TaskPayload) -> Result<Dispatched, Error> {
        payload.validate()?;
        let key = payload.cache_key();

        if let Some(result) = self.cache.get(&key).await? {
            debug!(task = %payload.kind(), %key, "cache hit");
            return Ok(Dispatched {
                result,
                cached: true,
            });
        }

        debug!(task = %payload.kind(), %key, "cache miss");
        let result = self.executor.process(payload).await?;
        self.cache.set(&key, &result, self.ttl).await?;
        Ok(Dispatched {
            result,
            cached: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        InferenceError, QaRequest, RewriteRequest, SummarizeRequest, Tone, ValidationError,
    };
    use crate::impls::InMemoryStore;
    use crate::ports::FixedClock;
    use crate::typed::{AdapterRegistry, InferenceAdapter};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl InferenceAdapter<SummarizeRequest> for Counting {
        async fn infer(&self, input: &SummarizeRequest) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(input.text.split('.').next().unwrap_or_default().to_string())
        }
    }

    #[async_trait]
    impl InferenceAdapter<QaRequest> for Counting {
        async fn infer(&self, _input: &QaRequest) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(InferenceError::Backend("model is loading".to_string()))
        }
    }

    #[async_trait]
    impl InferenceAdapter<RewriteRequest> for Counting {
        async fn infer(&self, input: &RewriteRequest) -> Result<String, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{}] {}", input.tone, input.text))
        }
    }

    struct Fixture {
        dispatcher: Dispatcher,
        store: Arc<InMemoryStore<FixedClock>>,
        clock: FixedClock,
        calls: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let adapter = Counting::default();
        let calls = Arc::clone(&adapter.calls);
        let mut registry = AdapterRegistry::new();
        registry.register::<SummarizeRequest, _>(adapter.clone()).unwrap();
        registry.register::<QaRequest, _>(adapter.clone()).unwrap();
        registry.register::<RewriteRequest, _>(adapter).unwrap();

        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        let executor = Arc::new(InferenceExecutor::new(Arc::new(registry), None));
        let dispatcher = Dispatcher::new(executor, store.clone(), Duration::from_secs(86_400));
        Fixture {
            dispatcher,
            store,
            clock,
            calls,
        }
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let f = fixture();
        let payload: TaskPayload = SummarizeRequest::new("The quick brown fox. It jumps.").into();

        let first = f.dispatcher.handle(&payload).await.unwrap();
        assert_eq!(first.result, "The quick brown fox");
        assert!(!first.cached);

        let second = f.dispatcher.handle(&payload).await.unwrap();
        assert_eq!(second.result, first.result);
        assert!(second.cached);
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
        assert_eq!(f.store.cached_len().await, 1);
    }

    #[tokio::test]
    async fn failed_inference_leaves_no_entry() {
        let f = fixture();
        let payload: TaskPayload =
            QaRequest::new("Paris is the capital of France.", "What is the capital?").into();

        let err = f.dispatcher.handle(&payload).await.unwrap_err();
        assert!(matches!(err, Error::Inference(InferenceError::Backend(_))));
        assert_eq!(f.store.cached_len().await, 0);

        // Retrying calls the adapter again
        let _ = f.dispatcher.handle(&payload).await;
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_payload_does_no_work() {
        let f = fixture();
        let payload: TaskPayload = SummarizeRequest::new("").into();

        let err = f.dispatcher.handle(&payload).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::EmptyField("text"))));
        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.store.cached_len().await, 0);
    }

    #[tokio::test]
    async fn tone_is_part_of_the_identity() {
        let f = fixture();
        let formal: TaskPayload = RewriteRequest::new("hey, what's up", Tone::Formal).into();
        let informal: TaskPayload = RewriteRequest::new("hey, what's up", Tone::Informal).into();

        assert!(!f.dispatcher.handle(&formal).await.unwrap().cached);
        let other = f.dispatcher.handle(&informal).await.unwrap();
        assert!(!other.cached);
        assert_eq!(other.result, "[informal] hey, what's up");
    }

    #[tokio::test]
    async fn expired_entries_are_recomputed() {
        let f = fixture();
        let payload: TaskPayload = SummarizeRequest::new("Short text. More.").into();

        f.dispatcher.handle(&payload).await.unwrap();
        f.clock.advance(chrono::Duration::seconds(86_401));

        let again = f.dispatcher.handle(&payload).await.unwrap();
        assert!(!again.cached);
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
    }
}
