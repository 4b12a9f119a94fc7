use async_trait::async_trait;

use super::StoreError;

/// Reachability check for the shared store.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
