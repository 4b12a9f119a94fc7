//! Ports - 抽象化レイヤー
//!
//! 各 trait は外部システム（Redis, 推論バックエンドなど）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - Redis は共有ストア（結果キャッシュ、ジョブレコード、配送キュー）
//! - API プロセスと worker プロセスが同じストアを読み書きする
//! - プロセス内にロックを跨ぐ await はない

pub mod clock;
pub mod error;
pub mod health;
pub mod id_generator;
pub mod job_queue;
pub mod job_store;
pub mod result_cache;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::error::StoreError;
pub use self::health::StoreHealth;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::job_queue::JobQueue;
pub use self::job_store::JobStore;
pub use self::result_cache::ResultCache;
