//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **Dispatcher**: 同期パス（validate → cache → infer → cache set）
//! - **JobTracker**: submit / status / result
//! - **JobWorker / WorkerGroup**: ジョブ実行ループ（pop → running → finished/failed）
//! - **HealthCheck**: ストアの到達性

pub mod builder;
pub mod dispatcher;
pub mod executor;
pub mod health;
pub mod tracker;
pub mod worker_loop;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::dispatcher::{Dispatched, Dispatcher};
pub use self::executor::InferenceExecutor;
pub use self::health::{HealthCheck, HealthReport};
pub use self::tracker::{JobTracker, JobView};
pub use self::worker_loop::{JobWorker, Tick, WorkerGroup};
