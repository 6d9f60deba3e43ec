//! Tool System
//!
//! Extensible tool framework for agent capabilities.
//! Tools are registered at startup, declared to the model as functions, and
//! invoked by the protocol driver when the model asks for them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::session::SessionId;

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID assigned by the model
    pub id: String,

    /// Tool identifier
    pub name: String,

    /// Raw JSON argument payload, exactly as the model produced it
    #[serde(default)]
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the argument payload as a JSON object.
    ///
    /// Malformed JSON or a non-object payload yields an empty map so that tools
    /// can fall back to per-field defaults instead of rejecting the call.
    pub fn parsed_arguments(&self) -> Map<String, Value> {
        if self.arguments.trim().is_empty() {
            return Map::new();
        }

        match serde_json::from_str::<Value>(&self.arguments) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::warn!(tool = %self.name, kind = ?other, "Tool arguments are not an object, using defaults");
                Map::new()
            }
            Err(e) => {
                tracing::warn!(tool = %self.name, error = %e, "Malformed tool arguments, using defaults");
                Map::new()
            }
        }
    }
}

/// Outcome status reported back to the model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID this result answers
    pub call_id: Option<String>,

    /// Whether execution succeeded
    pub status: ToolStatus,

    /// Human-readable outcome (success message or error)
    pub message: String,

    /// Structured data (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            call_id: None,
            status: ToolStatus::Success,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            call_id: None,
            status: ToolStatus::Error,
            message: error.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_call_id(mut self, id: impl Into<String>) -> Self {
        self.call_id = Some(id.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }

    /// Payload sent to the model as the tool message content
    pub fn payload(&self) -> Value {
        let mut payload = json!({
            "status": self.status,
            "message": self.message,
        });
        if let (Some(data), Some(obj)) = (&self.data, payload.as_object_mut()) {
            obj.insert("data".into(), data.clone());
        }
        payload
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    pub fn required(name: &str, param_type: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: &str, param_type: &str, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// JSON Schema object describing the parameters
    pub fn parameters_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({ "type": p.param_type, "description": p.description }),
                )
            })
            .collect();

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Function declaration in the chat-completions `tools` format
    pub fn to_function_declaration(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters_json(),
            }
        })
    }
}

/// Per-turn context handed to tools
#[derive(Clone, Debug)]
pub struct ToolContext {
    /// Session the current turn belongs to
    pub session_id: SessionId,
}

impl ToolContext {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments.
    ///
    /// Domain failures should be reported as `ToolResult::failure`; an `Err`
    /// is reserved for failures of the tool machinery itself.
    async fn execute(&self, ctx: &ToolContext, call: &ToolCall) -> Result<ToolResult>;
}

/// Registry for available tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let schema = tool.schema();
        self.tools.insert(schema.name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Whether a tool with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Execute a tool call
    pub async fn execute(&self, ctx: &ToolContext, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.execute(ctx, call).await
    }

    /// Get all tool schemas
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
