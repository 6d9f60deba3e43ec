//! Conversation Messages
//!
//! Standard message format used across the agent system. Assistant messages
//! may carry tool invocations; tool messages answer one of them by call ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tool::ToolCall;

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant (LLM) response
    Assistant,
    /// Tool result fed back to the model
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content (empty when an assistant message only carries tool calls)
    #[serde(default)]
    pub content: String,

    /// Tool name, set on tool result messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tool invocations requested by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,

    /// The call this tool message answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    #[serde(default = "Utc::now", skip_serializing)]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message that records the tool calls it requested
    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        msg.tool_calls = calls;
        msg
    }

    /// Create a tool result message answering `call_id`
    pub fn tool(
        content: impl Into<String>,
        name: impl Into<String>,
        call_id: impl Into<String>,
    ) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.name = Some(name.into());
        msg.tool_call_id = Some(call_id.into());
        msg
    }

    /// Whether this assistant message requested any tool
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(!msg.has_tool_calls());
    }

    #[test]
    fn test_tool_message_links_call() {
        let msg = Message::tool(r#"{"status":"success"}"#, "UpdatePortfolioTool", "call_1");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.name.as_deref(), Some("UpdatePortfolioTool"));
    }

    #[test]
    fn test_inbound_wire_shape() {
        let msg: Message = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::User);

        let json = serde_json::to_value(Message::assistant("ok")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "ok"}));
    }
}
