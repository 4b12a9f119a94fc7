//! Typed - 型付き推論 API
//!
//! # 二層構造
//! - **表層（Typed）**: `TaskInput` trait, `InferenceAdapter<T>` trait - 型安全
//! - **内部（Dyn）**: `DynAdapter` trait - object-safe, type erasure

pub mod adapter;
pub mod registry;
pub mod task;

pub use self::adapter::{DynAdapter, InferenceAdapter, TypedAdapter};
pub use self::registry::{AdapterRegistry, RegistryError};
pub use self::task::TaskInput;
