//! Builds an `App` from `Config`

use std::sync::Arc;

use textintel_core::app::{App, AppBuilder};
use textintel_core::config::{Config, QUEUE_NAME, StoreBackend};
use textintel_core::domain::{QaRequest, RewriteRequest, SummarizeRequest};
use textintel_core::impls::{HfInferenceClient, InMemoryJobQueue, InMemoryStore, ModelMap, RedisStore};
use textintel_core::ports::SystemClock;
use tracing::info;

pub fn build_app(config: &Config) -> anyhow::Result<App> {
    let client = HfInferenceClient::new(
        config.inference_url.clone(),
        config.inference_token.clone(),
        ModelMap::default(),
    );

    let builder = AppBuilder::new()
        .register::<SummarizeRequest, _>(client.clone())?
        .register::<QaRequest, _>(client.clone())?
        .register::<RewriteRequest, _>(client)?
        .with_ttls(config.ttls)
        .with_inference_timeout(config.inference_timeout);

    let builder = match config.store_backend {
        StoreBackend::Redis => {
            let store = Arc::new(RedisStore::open(&config.redis_url, QUEUE_NAME)?);
            info!(url = %config.redis_url, "using redis store");
            builder.with_store(store.clone()).with_queue(store)
        }
        StoreBackend::Memory => {
            info!("using in-memory store; jobs are only visible to this process");
            builder
                .with_store(Arc::new(InMemoryStore::new(SystemClock)))
                .with_queue(Arc::new(InMemoryJobQueue::new()))
        }
    };

    Ok(builder.build()?)
}
