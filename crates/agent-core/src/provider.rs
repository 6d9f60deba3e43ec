//! LLM Provider Strategy Pattern
//!
//! Defines a common interface for chat-completion backends with function
//! calling, so the protocol driver works with any of them without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = AzureOpenAiProvider::from_env()?;
//! let completion = provider.complete(&messages, &tools, &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 { 0.3 }
fn default_max_tokens() -> u32 { 800 }

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl GenerationOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Response from an LLM completion
#[derive(Clone, Debug, Default)]
pub struct Completion {
    /// The generated text (models may return none when they only call tools)
    pub content: Option<String>,

    /// Tool invocations requested by the model, in the order returned
    pub tool_calls: Vec<ToolCall>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// A plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        }
    }

    /// A reply that only requests tool calls
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            finish_reason: Some(FinishReason::ToolCalls),
            ..Default::default()
        }
    }

    /// Text content, or empty when the model returned none
    pub fn text_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    /// Short-circuited by a backend action instead of the model
    Tool,
    /// Anything else the provider reports, kept verbatim
    Other(String),
}

impl FinishReason {
    /// Parse the provider's wire value
    pub fn from_wire(value: &str) -> Self {
        match value {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "tool_calls" => FinishReason::ToolCalls,
            "content_filter" => FinishReason::ContentFilter,
            "tool" => FinishReason::Tool,
            other => FinishReason::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::ToolCalls => "tool_calls",
            FinishReason::ContentFilter => "content_filter",
            FinishReason::Tool => "tool",
            FinishReason::Other(s) => s,
        }
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "AzureOpenAI")
    pub name: String,

    /// Model or deployment served
    pub model: String,

    /// Whether tool/function calling is supported
    pub supports_tools: bool,
}

/// Strategy trait for LLM providers
///
/// Implement this trait to add support for new LLM backends.
/// The protocol driver works exclusively through this interface.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get provider information and capabilities
    fn info(&self) -> ProviderInfo;

    /// Check if the provider is configured and reachable
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from messages, declaring `tools` as callable
    /// functions (an empty slice disables tool selection)
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}
