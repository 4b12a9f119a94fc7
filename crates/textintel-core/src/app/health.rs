//! Health - 共有ストアの到達性

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::ports::StoreHealth;

/// `{"ok": true, "redis": true}` or `{"ok": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct HealthCheck {
    store: Arc<dyn StoreHealth>,
}

impl HealthCheck {
    pub fn new(store: Arc<dyn StoreHealth>) -> Self {
        Self { store }
    }

    pub async fn check(&self) -> HealthReport {
        match self.store.ping().await {
            Ok(()) => HealthReport {
                ok: true,
                redis: (self.store.backend() == "redis").then_some(true),
                error: None,
            },
            Err(e) => {
                warn!(backend = self.store.backend(), error = %e, "store health check failed");
                HealthReport {
                    ok: false,
                    redis: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryStore, RedisStore};
    use crate::ports::SystemClock;

    #[tokio::test]
    async fn memory_backend_is_always_healthy() {
        let check = HealthCheck::new(Arc::new(InMemoryStore::new(SystemClock)));
        let report = check.check().await;
        assert!(report.ok);
        assert_eq!(report.redis, None);
        assert_eq!(serde_json::to_value(&report).unwrap(), serde_json::json!({ "ok": true }));
    }

    #[tokio::test]
    async fn unreachable_redis_reports_the_error() {
        let store = RedisStore::open("redis://127.0.0.1:1/0", "genai").unwrap();
        let report = HealthCheck::new(Arc::new(store)).check().await;
        assert!(!report.ok);
        assert!(report.error.is_some());
        assert_eq!(report.redis, None);
    }
}
