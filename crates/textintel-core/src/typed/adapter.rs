//! InferenceAdapter trait - 推論ルーチンの抽象化
//!
//! # 学習ポイント
//! - ジェネリック trait (InferenceAdapter<T>)
//! - Object-safe trait (DynAdapter)
//! - Type erasure パターン (TypedAdapter<T, A> → DynAdapter)

use async_trait::async_trait;
use std::marker::PhantomData;

use super::task::TaskInput;
use crate::domain::{InferenceError, TaskKind, TaskPayload};

/// InferenceAdapter は型付き入力からテキストを生成する
///
/// # 使用例
/// ```ignore
/// struct EchoSummarizer;
///
/// #[async_trait]
/// impl InferenceAdapter<SummarizeRequest> for EchoSummarizer {
///     async fn infer(&self, input: &SummarizeRequest) -> Result<String, InferenceError> {
///         Ok(input.text.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait InferenceAdapter<T: TaskInput>: Send + Sync {
    async fn infer(&self, input: &T) -> Result<String, InferenceError>;
}

/// DynAdapter は object-safe な InferenceAdapter の抽象化
///
/// `HashMap<TaskKind, Arc<dyn DynAdapter>>` に格納するための層。
#[async_trait]
pub trait DynAdapter: Send + Sync {
    async fn infer_dyn(&self, payload: &TaskPayload) -> Result<String, InferenceError>;
    fn kind(&self) -> TaskKind;
}

pub struct TypedAdapter<T: TaskInput, A: InferenceAdapter<T>> {
    adapter: A,
    _marker: PhantomData<fn(T)>,
}

impl<T: TaskInput, A: InferenceAdapter<T>> TypedAdapter<T, A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: TaskInput, A: InferenceAdapter<T>> DynAdapter for TypedAdapter<T, A> {
    async fn infer_dyn(&self, payload: &TaskPayload) -> Result<String, InferenceError> {
        let input = T::from_payload(payload).ok_or(InferenceError::PayloadMismatch {
            expected: T::KIND,
            actual: payload.kind(),
        })?;
        self.adapter.infer(input).await
    }

    fn kind(&self) -> TaskKind {
        T::KIND
    }
}
