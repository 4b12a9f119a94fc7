//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryStore**: 開発用・テスト用の結果キャッシュ + ジョブレコード
//! - **InMemoryJobQueue**: 開発用の配送キュー
//! - **RedisStore**: 本番用（キャッシュ, ジョブレコード, キュー）
//! - **HfInferenceClient**: HTTP 推論アダプタ

pub mod hf_adapter;
pub mod inmem_queue;
pub mod memory_store;
pub mod redis_store;

pub use self::hf_adapter::{HfInferenceClient, ModelMap};
pub use self::inmem_queue::InMemoryJobQueue;
pub use self::memory_store::InMemoryStore;
pub use self::redis_store::RedisStore;
