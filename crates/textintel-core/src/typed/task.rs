//! TaskInput trait - 型付き入力と TaskKind の対応付け
//!
//! # 学習ポイント
//! - Associated Constants (`const KIND`)
//! - `TaskPayload` との相互変換で enum の網羅性を保つ

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{QaRequest, RewriteRequest, SummarizeRequest, TaskKind, TaskPayload};
use crate::fingerprint::Fingerprinted;

/// Typed input of one task variant.
///
/// # Trait Bounds
/// - `Serialize + DeserializeOwned`: HTTP body / job record との変換
/// - `Fingerprinted`: cache key の導出
/// - `Send + Sync + 'static`: Arc に格納して複数タスクから使う
pub trait TaskInput:
    Serialize + DeserializeOwned + Fingerprinted + Clone + Send + Sync + 'static
{
    const KIND: TaskKind;

    /// Borrow the typed input out of a payload of the matching variant.
    fn from_payload(payload: &TaskPayload) -> Option<&Self>;

    fn into_payload(self) -> TaskPayload;
}

impl TaskInput for SummarizeRequest {
    const KIND: TaskKind = TaskKind::Summarize;

    fn from_payload(payload: &TaskPayload) -> Option<&Self> {
        match payload {
            TaskPayload::Summarize(req) => Some(req),
            TaskPayload::Qa(_) | TaskPayload::Rewrite(_) => None,
        }
    }

    fn into_payload(self) -> TaskPayload {
        TaskPayload::Summarize(self)
    }
}

impl TaskInput for QaRequest {
    const KIND: TaskKind = TaskKind::Qa;

    fn from_payload(payload: &TaskPayload) -> Option<&Self> {
        match payload {
            TaskPayload::Qa(req) => Some(req),
            TaskPayload::Summarize(_) | TaskPayload::Rewrite(_) => None,
        }
    }

    fn into_payload(self) -> TaskPayload {
        TaskPayload::Qa(self)
    }
}

impl TaskInput for RewriteRequest {
    const KIND: TaskKind = TaskKind::Rewrite;

    fn from_payload(payload: &TaskPayload) -> Option<&Self> {
        match payload {
            TaskPayload::Rewrite(req) => Some(req),
            TaskPayload::Summarize(_) | TaskPayload::Qa(_) => None,
        }
    }

    fn into_payload(self) -> TaskPayload {
        TaskPayload::Rewrite(self)
    }
}
