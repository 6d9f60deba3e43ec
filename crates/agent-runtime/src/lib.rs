//! # agent-runtime
//!
//! Runtime providers for the advisory agent.
//!
//! ## Providers
//!
//! - **Azure OpenAI** (default): chat completions with function calling
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::AzureOpenAiProvider;
//!
//! let provider = AzureOpenAiProvider::from_env()?;
//! let driver = ToolCallDriver::new(Arc::new(provider), tools, ProtocolConfig::default());
//! ```

#[cfg(feature = "azure")]
pub mod azure;

#[cfg(feature = "azure")]
pub use azure::{AzureOpenAiConfig, AzureOpenAiProvider};

// Re-export core types for convenience
pub use agent_core::{AgentError, LlmProvider, Message, Result, Role, Tool, ToolRegistry};
