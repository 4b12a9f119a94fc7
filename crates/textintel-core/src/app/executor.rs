//! InferenceExecutor - `process(task, payload)`
//!
//! The inference step shared by the synchronous dispatcher and the worker.
//! It never touches the cache.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{InferenceError, TaskPayload};
use crate::typed::AdapterRegistry;

pub struct InferenceExecutor {
    registry: Arc<AdapterRegistry>,
    timeout: Option<Duration>,
}

impl InferenceExecutor {
    pub fn new(registry: Arc<AdapterRegistry>, timeout: Option<Duration>) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Run the adapter bound to the payload's task.
    pub async fn process(&self, payload: &TaskPayload) -> Result<String, InferenceError> {
        let kind = payload.kind();
        let adapter = self
            .registry
            .get(kind)
            .ok_or(InferenceError::AdapterMissing(kind))?;

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, adapter.infer_dyn(payload))
                .await
                .map_err(|_| InferenceError::Timeout(limit))?,
            None => adapter.infer_dyn(payload).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QaRequest, RewriteRequest, SummarizeRequest, TaskKind, Tone};
    use crate::typed::InferenceAdapter;
    use async_trait::async_trait;

    struct Slow;

    #[async_trait]
    impl InferenceAdapter<SummarizeRequest> for Slow {
        async fn infer(&self, _input: &SummarizeRequest) -> Result<String, InferenceError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("late".to_string())
        }
    }

    struct Answer;

    #[async_trait]
    impl InferenceAdapter<QaRequest> for Answer {
        async fn infer(&self, _input: &QaRequest) -> Result<String, InferenceError> {
            Ok("Paris".to_string())
        }
    }

    fn executor(timeout: Option<Duration>) -> InferenceExecutor {
        let mut registry = AdapterRegistry::new();
        registry.register::<SummarizeRequest, _>(Slow).unwrap();
        registry.register::<QaRequest, _>(Answer).unwrap();
        InferenceExecutor::new(Arc::new(registry), timeout)
    }

    #[tokio::test]
    async fn dispatches_to_the_bound_adapter() {
        let out = executor(None)
            .process(&QaRequest::new("Paris is the capital of France.", "Capital?").into())
            .await
            .unwrap();
        assert_eq!(out, "Paris");
    }

    #[tokio::test]
    async fn missing_adapter_is_reported() {
        let err = executor(None)
            .process(&RewriteRequest::new("hi", Tone::Formal).into())
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::AdapterMissing(TaskKind::Rewrite)));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_cuts_slow_inference_short() {
        let err = executor(Some(Duration::from_secs(5)))
            .process(&SummarizeRequest::new("long text").into())
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Timeout(d) if d == Duration::from_secs(5)));
    }
}
