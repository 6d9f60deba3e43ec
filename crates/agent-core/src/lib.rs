//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction, a tool system and
//! the two-phase tool-call protocol.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ToolCallDriver                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐   │
//! │  │  Protocol   │  │    Tools    │  │   LlmProvider       │   │
//! │  │   (FSM)     │──│   Registry  │──│   (Strategy)        │   │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Azure OpenAI or any other
//! function-calling backend without changing the protocol.

pub mod provider;
pub mod tool;
pub mod protocol;
pub mod message;
pub mod error;
pub mod session;
pub mod mock;

pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use protocol::{ProtocolConfig, ProtocolState, ToolCallDriver, TurnOutcome};
pub use provider::{Completion, FinishReason, GenerationOptions, LlmProvider};
pub use session::SessionId;
pub use tool::{Tool, ToolCall, ToolContext, ToolRegistry, ToolResult, ToolSchema, ToolStatus};
