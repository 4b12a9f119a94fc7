//! ResultCache port - 推論結果のキャッシュ
//!
//! get/set only. Two concurrent misses on one key may both run inference and
//! both write; the last write wins.

use async_trait::async_trait;
use std::time::Duration;

use super::StoreError;
use crate::fingerprint::CacheKey;

#[async_trait]
pub trait ResultCache: Send + Sync {
    /// `None` when the key is unset or its TTL has passed.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, StoreError>;

    /// Store `value`, replacing any previous entry, absent again after `ttl`.
    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), StoreError>;
}
