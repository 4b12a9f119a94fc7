//! Content fingerprints and cache keys.
//!
//! Key form: `cache:{task}:{modifier}:{sha256-hex}`. `:` is reserved; task
//! identifiers and modifiers never contain it.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::{QaRequest, RewriteRequest, SummarizeRequest, TaskKind, TaskPayload};

const NAMESPACE: &str = "cache";
const DELIMITER: char = ':';

/// Separates fields that are hashed together (U+001F, unit separator).
const FIELD_SEPARATOR: char = '\u{1f}';

/// SHA-256 of the UTF-8 bytes, lowercase hex (64 chars).
pub fn fingerprint(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task identifier + modifier (empty when not applicable) + content digest.
pub fn cache_key(task: TaskKind, modifier: &str, content: &str) -> CacheKey {
    debug_assert!(!modifier.contains(DELIMITER));
    CacheKey(format!(
        "{NAMESPACE}{DELIMITER}{task}{DELIMITER}{modifier}{DELIMITER}{}",
        fingerprint(content)
    ))
}

/// Payloads that know which of their fields identify a result.
pub trait Fingerprinted {
    fn cache_key(&self) -> CacheKey;
}

impl Fingerprinted for SummarizeRequest {
    fn cache_key(&self) -> CacheKey {
        // Length bounds change the summary, so they are part of the key.
        let modifier = format!("{}-{}", self.max_length(), self.min_length());
        cache_key(TaskKind::Summarize, &modifier, &self.text)
    }
}

impl Fingerprinted for QaRequest {
    fn cache_key(&self) -> CacheKey {
        let mut content = String::with_capacity(self.context.len() + self.question.len() + 1);
        content.push_str(&self.context);
        content.push(FIELD_SEPARATOR);
        content.push_str(&self.question);
        cache_key(TaskKind::Qa, "", &content)
    }
}

impl Fingerprinted for RewriteRequest {
    fn cache_key(&self) -> CacheKey {
        cache_key(TaskKind::Rewrite, self.tone.as_str(), &self.text)
    }
}

impl Fingerprinted for TaskPayload {
    fn cache_key(&self) -> CacheKey {
        match self {
            TaskPayload::Summarize(req) => req.cache_key(),
            TaskPayload::Qa(req) => req.cache_key(),
            TaskPayload::Rewrite(req) => req.cache_key(),
        }
    }
}
