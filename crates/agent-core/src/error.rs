//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider returned an error response
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unreachable, timed out, or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Parse error (e.g., malformed provider response)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Required credentials or endpoints are missing
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Whether the failure came from the upstream model service rather than local code
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AgentError::Provider(_)
                | AgentError::ProviderUnavailable(_)
                | AgentError::RateLimited(_)
                | AgentError::Auth(_)
                | AgentError::Parse(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(msg) => format!("The AI service encountered an error: {}", msg),
            AgentError::ProviderUnavailable(_) => "The AI service is currently unavailable. Please try again.".into(),
            AgentError::ToolNotFound(name) => format!("The tool '{}' is not available.", name),
            AgentError::ToolExecution(msg) => format!("Tool error: {}", msg),
            AgentError::Config(_) => "The AI service is not configured.".into(),
            AgentError::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            AgentError::Auth(_) => "Authentication with the AI service failed.".into(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
