//! AdapterRegistry - 推論アダプタの登録と管理
//!
//! Built once at startup, then shared read-only through `Arc`. Each task gets
//! exactly one adapter.

use std::collections::HashMap;
use std::sync::Arc;

use super::adapter::{DynAdapter, InferenceAdapter, TypedAdapter};
use super::task::TaskInput;
use crate::domain::TaskKind;

/// # 内部実装
/// - `register::<T: TaskInput>(adapter: impl InferenceAdapter<T>)` で登録
/// - 内部的に TypedAdapter でラップして DynAdapter に変換
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<TaskKind, Arc<dyn DynAdapter>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("adapter for task '{0}' is already registered")]
    AlreadyRegistered(TaskKind),
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register<T: TaskInput, A: InferenceAdapter<T> + 'static>(
        &mut self,
        adapter: A,
    ) -> Result<(), RegistryError> {
        if self.adapters.contains_key(&T::KIND) {
            return Err(RegistryError::AlreadyRegistered(T::KIND));
        }
        let typed = TypedAdapter::<T, A>::new(adapter);
        self.adapters.insert(T::KIND, Arc::new(typed));
        Ok(())
    }

    pub fn get(&self, kind: TaskKind) -> Option<Arc<dyn DynAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    pub fn registered_kinds(&self) -> Vec<TaskKind> {
        let mut kinds: Vec<_> = self.adapters.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Tasks with no adapter yet, in declaration order.
    pub fn missing_kinds(&self) -> Vec<TaskKind> {
        TaskKind::ALL
            .into_iter()
            .filter(|kind| !self.adapters.contains_key(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InferenceError, QaRequest, RewriteRequest, SummarizeRequest};
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl InferenceAdapter<SummarizeRequest> for Fixed {
        async fn infer(&self, _input: &SummarizeRequest) -> Result<String, InferenceError> {
            Ok(self.0.to_string())
        }
    }

    #[async_trait]
    impl InferenceAdapter<QaRequest> for Fixed {
        async fn infer(&self, _input: &QaRequest) -> Result<String, InferenceError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = AdapterRegistry::new();
        registry
            .register::<SummarizeRequest, _>(Fixed("summary"))
            .unwrap();

        let adapter = registry.get(TaskKind::Summarize).unwrap();
        assert_eq!(adapter.kind(), TaskKind::Summarize);
        assert!(registry.get(TaskKind::Qa).is_none());
    }

    #[test]
    fn test_double_registration() {
        let mut registry = AdapterRegistry::new();
        registry.register::<SummarizeRequest, _>(Fixed("a")).unwrap();
        let result = registry.register::<SummarizeRequest, _>(Fixed("b"));
        assert!(matches!(
            result,
            Err(RegistryError::AlreadyRegistered(TaskKind::Summarize))
        ));
    }

    #[test]
    fn test_missing_kinds() {
        let mut registry = AdapterRegistry::new();
        assert_eq!(registry.missing_kinds(), TaskKind::ALL.to_vec());

        registry.register::<SummarizeRequest, _>(Fixed("a")).unwrap();
        registry.register::<QaRequest, _>(Fixed("b")).unwrap();
        assert_eq!(registry.missing_kinds(), vec![RewriteRequest::KIND]);
        assert_eq!(
            registry.registered_kinds(),
            vec![TaskKind::Summarize, TaskKind::Qa]
        );
    }
}
