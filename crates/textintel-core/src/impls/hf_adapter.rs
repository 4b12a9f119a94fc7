//! HfInferenceClient - Hugging Face Inference API 互換の HTTP アダプタ
//!
//! `POST {base_url}/models/{model}` with `{"inputs": ..., "parameters": ...}`.
//! One client serves all three tasks; each task is bound to a fixed model.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{InferenceError, QaRequest, RewriteRequest, SummarizeRequest, TaskKind};
use crate::typed::InferenceAdapter;

/// Upper bound on generated tokens for tone rewriting.
const REWRITE_MAX_LENGTH: u32 = 200;

/// Static task → model binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMap {
    pub summarize: String,
    pub qa: String,
    pub rewrite: String,
}

impl Default for ModelMap {
    fn default() -> Self {
        Self {
            summarize: "sshleifer/distilbart-cnn-12-6".to_string(),
            qa: "distilbert-base-cased-distilled-squad".to_string(),
            rewrite: "google/flan-t5-small".to_string(),
        }
    }
}

impl ModelMap {
    pub fn model_for(&self, kind: TaskKind) -> &str {
        match kind {
            TaskKind::Summarize => &self.summarize,
            TaskKind::Qa => &self.qa,
            TaskKind::Rewrite => &self.rewrite,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct AnswerBody {
    answer: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedItem {
    generated_text: String,
}

/// Cheap to clone: `reqwest::Client` is reference counted.
#[derive(Debug, Clone)]
pub struct HfInferenceClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    models: ModelMap,
}

impl HfInferenceClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>, models: ModelMap) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            models,
        }
    }

    fn endpoint(&self, kind: TaskKind) -> String {
        format!("{}/models/{}", self.base_url, self.models.model_for(kind))
    }

    async fn call<R: DeserializeOwned>(&self, kind: TaskKind, body: Value) -> Result<R, InferenceError> {
        let url = self.endpoint(kind);
        debug!(task = %kind, %url, "calling inference backend");

        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InferenceError::Backend(format!("{url} returned {status}: {detail}")));
        }
        response
            .json::<R>()
            .await
            .map_err(|e| InferenceError::MalformedResponse(e.to_string()))
    }
}

/// Prompt sent to the text2text model for tone rewriting.
pub fn rewrite_prompt(req: &RewriteRequest) -> String {
    format!("Rewrite the following text in a {} tone:\n{}", req.tone, req.text)
}

fn first<T>(items: Vec<T>) -> Result<T, InferenceError> {
    items
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::MalformedResponse("empty result list".to_string()))
}

#[async_trait]
impl InferenceAdapter<SummarizeRequest> for HfInferenceClient {
    async fn infer(&self, input: &SummarizeRequest) -> Result<String, InferenceError> {
        let body = json!({
            "inputs": input.text,
            "parameters": {
                "max_length": input.max_length(),
                "min_length": input.min_length(),
                "truncation": true,
            },
        });
        let items: Vec<SummaryItem> = self.call(TaskKind::Summarize, body).await?;
        Ok(first(items)?.summary_text.trim().to_string())
    }
}

#[async_trait]
impl InferenceAdapter<QaRequest> for HfInferenceClient {
    async fn infer(&self, input: &QaRequest) -> Result<String, InferenceError> {
        let body = json!({
            "inputs": {
                "question": input.question,
                "context": input.context,
            },
        });
        let answer: AnswerBody = self.call(TaskKind::Qa, body).await?;
        Ok(answer.answer)
    }
}

#[async_trait]
impl InferenceAdapter<RewriteRequest> for HfInferenceClient {
    async fn infer(&self, input: &RewriteRequest) -> Result<String, InferenceError> {
        let body = json!({
            "inputs": rewrite_prompt(input),
            "parameters": { "max_length": REWRITE_MAX_LENGTH },
        });
        let items: Vec<GeneratedItem> = self.call(TaskKind::Rewrite, body).await?;
        Ok(first(items)?.generated_text.trim().to_string())
    }
}
