//! Task descriptors and their typed payloads.
//!
//! The task set is closed: `TaskKind` and `TaskPayload` are matched
//! exhaustively everywhere, so adding a task is a compile error until every
//! layer handles it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::ValidationError;

pub const DEFAULT_MAX_LENGTH: u32 = 150;
pub const DEFAULT_MIN_LENGTH: u32 = 25;

/// The fixed set of text tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Summarize,
    Qa,
    Rewrite,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [TaskKind::Summarize, TaskKind::Qa, TaskKind::Rewrite];

    /// Identifier used in routes and cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::Summarize => "summarize",
            TaskKind::Qa => "qa",
            TaskKind::Rewrite => "rewrite",
        }
    }

    /// Label reported in the `task` field of synchronous responses.
    pub fn label(self) -> &'static str {
        match self {
            TaskKind::Summarize => "summarization",
            TaskKind::Qa => "qa",
            TaskKind::Rewrite => "rewrite",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownTaskType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Informal,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Formal => "formal",
            Tone::Informal => "informal",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
}

impl SummarizeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_length: None,
            min_length: None,
        }
    }

    pub fn with_lengths(mut self, max_length: u32, min_length: u32) -> Self {
        self.max_length = Some(max_length);
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(&self) -> u32 {
        self.max_length.unwrap_or(DEFAULT_MAX_LENGTH)
    }

    pub fn min_length(&self) -> u32 {
        self.min_length.unwrap_or(DEFAULT_MIN_LENGTH)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("text", &self.text)?;
        let (max_length, min_length) = (self.max_length(), self.min_length());
        if max_length == 0 || min_length > max_length {
            return Err(ValidationError::LengthBounds {
                min_length,
                max_length,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRequest {
    pub context: String,
    pub question: String,
}

impl QaRequest {
    pub fn new(context: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            question: question.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("context", &self.context)?;
        require_text("question", &self.question)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub text: String,
    pub tone: Tone,
}

impl RewriteRequest {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("text", &self.text)
    }
}

// Whitespace is real input; only an empty string counts as missing.
fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// One task plus the fields it needs.
///
/// Stored form: `{"task": "qa", "payload": {"context": ..., "question": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", content = "payload", rename_all = "lowercase")]
pub enum TaskPayload {
    Summarize(SummarizeRequest),
    Qa(QaRequest),
    Rewrite(RewriteRequest),
}

impl TaskPayload {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskPayload::Summarize(_) => TaskKind::Summarize,
            TaskPayload::Qa(_) => TaskKind::Qa,
            TaskPayload::Rewrite(_) => TaskKind::Rewrite,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            TaskPayload::Summarize(req) => req.validate(),
            TaskPayload::Qa(req) => req.validate(),
            TaskPayload::Rewrite(req) => req.validate(),
        }
    }

    /// Decode the untyped body of a job submission into the variant for `kind`.
    pub fn from_json(kind: TaskKind, body: serde_json::Value) -> Result<Self, ValidationError> {
        let payload = match kind {
            TaskKind::Summarize => TaskPayload::Summarize(decode(body)?),
            TaskKind::Qa => TaskPayload::Qa(decode(body)?),
            TaskKind::Rewrite => TaskPayload::Rewrite(decode(body)?),
        };
        payload.validate()?;
        Ok(payload)
    }
}

// serde's derived visitors also accept a JSON array as a struct; bodies are objects only.
fn decode<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, ValidationError> {
    if !body.is_object() {
        return Err(ValidationError::Malformed(format!(
            "expected a JSON object, found {}",
            json_type(&body)
        )));
    }
    serde_json::from_value(body).map_err(|e| ValidationError::Malformed(e.to_string()))
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl From<SummarizeRequest> for TaskPayload {
    fn from(req: SummarizeRequest) -> Self {
        TaskPayload::Summarize(req)
    }
}

impl From<QaRequest> for TaskPayload {
    fn from(req: QaRequest) -> Self {
        TaskPayload::Qa(req)
    }
}

impl From<RewriteRequest> for TaskPayload {
    fn from(req: RewriteRequest) -> Self {
        TaskPayload::Rewrite(req)
    }
}
