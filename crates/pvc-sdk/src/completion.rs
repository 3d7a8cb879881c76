//! Text-completion collaborator and commit message drafting.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DraftingConfig;
use crate::error::{SdkError, SdkResult};

/// Input for a single completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_query: String,
    pub model: String,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Generated text plus accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub latency_ms: u64,
}

/// A model provider able to answer a system prompt plus user query.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> SdkResult<CompletionResponse>;
}

#[async_trait]
impl<T: TextCompletion + ?Sized> TextCompletion for Arc<T> {
    async fn complete(&self, request: CompletionRequest) -> SdkResult<CompletionResponse> {
        (**self).complete(request).await
    }
}

const DRAFT_INSTRUCTIONS: &str = "You write commit messages for prompt changes. \
Reply with a single imperative line describing how the new system prompt differs \
from the old one. No quotes, no trailing period.";

/// Message returned without a model call when nothing changed.
pub const NO_CHANGES_MESSAGE: &str = "No changes to system prompt";

/// Drafts one-line commit messages from an old/new system prompt pair.
pub struct CommitMessageDrafter<C> {
    client: C,
    model: String,
    max_chars: usize,
}

impl<C: TextCompletion> CommitMessageDrafter<C> {
    pub fn new(client: C, config: &DraftingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            max_chars: config.max_message_chars,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Draft a message for the change from `old` to `new`.
    ///
    /// Identical inputs return [`NO_CHANGES_MESSAGE`] without calling the
    /// model. The reply is reduced to its first non-empty line, stripped of
    /// surrounding quotes, and cut to the configured length.
    pub async fn draft(&self, old: &str, new: &str) -> SdkResult<String> {
        if old == new {
            return Ok(NO_CHANGES_MESSAGE.to_string());
        }
        let request = CompletionRequest {
            system_prompt: DRAFT_INSTRUCTIONS.to_string(),
            user_query: format!("Old system prompt:\n{old}\n\nNew system prompt:\n{new}"),
            model: self.model.clone(),
        };
        let response = self.client.complete(request).await?;
        debug!(
            model = %response.model,
            tokens = response.usage.total(),
            latency_ms = response.latency_ms,
            "drafted commit message"
        );
        let message = tidy_message(&response.content, self.max_chars);
        if message.is_empty() {
            return Err(SdkError::Completion("model returned an empty message".into()));
        }
        Ok(message)
    }
}

fn tidy_message(raw: &str, max_chars: usize) -> String {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let line = line.trim_matches(|c| c == '"' || c == '\'' || c == '`').trim();
    line.chars().take(max_chars).collect::<String>().trim_end().to_string()
}
