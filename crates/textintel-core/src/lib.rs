//! textintel-core
//!
//! Core building blocks for the textintel service.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（task, ids, job, state, errors）
//! - **fingerprint**: content digest と cache key
//! - **ports**: 抽象化レイヤー（ResultCache, JobStore, JobQueue, StoreHealth, Clock, IdGenerator）
//! - **typed**: 型付き推論 API（TaskInput, InferenceAdapter, AdapterRegistry）
//! - **app**: アプリケーションロジック（builder, dispatcher, tracker, worker_loop, health）
//! - **impls**: 実装（InMemoryStore, RedisStore, HfInferenceClient など）
//! - **config**: 環境変数からの設定

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod impls;
pub mod ports;
pub mod typed;

pub use self::error::{Error, ErrorKind};
