//! Scripted Provider
//!
//! For testing and demo purposes. Replays queued completions in order and
//! records every request it receives.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, GenerationOptions, LlmProvider, ProviderInfo};
use crate::tool::ToolSchema;

/// A request observed by [`ScriptedProvider`]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub options: GenerationOptions,
}

/// Provider returning pre-scripted replies
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<Completion>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    healthy: bool,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Completion>) -> Self {
        Self::from_results(replies.into_iter().map(Ok).collect())
    }

    /// Script replies that may include failures
    pub fn from_results(replies: Vec<Result<Completion>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            healthy: true,
        }
    }

    /// Report `healthy` from `health_check`
    pub fn with_health(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "Scripted".into(),
            model: "scripted".into(),
            supports_tools: true,
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.healthy)
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.requests.lock().await.push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            options: options.clone(),
        });

        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Provider("no scripted reply left".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_then_fails() {
        let provider = ScriptedProvider::new(vec![Completion::text("one"), Completion::text("two")]);
        let opts = GenerationOptions::default();

        let first = provider.complete(&[Message::user("a")], &[], &opts).await.unwrap();
        let second = provider.complete(&[Message::user("b")], &[], &opts).await.unwrap();
        assert_eq!(first.text_or_empty(), "one");
        assert_eq!(second.text_or_empty(), "two");
        assert!(provider.complete(&[], &[], &opts).await.is_err());
        assert_eq!(provider.requests().await.len(), 3);
    }
}
