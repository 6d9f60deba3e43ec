//! Tool-Call Protocol
//!
//! Drives one conversational turn through the two-phase function-calling
//! exchange as an explicit state machine:
//!
//! ```text
//! AwaitingModel ──▶ ModelResponded ──▶ Done            (no tool requested)
//!                         │
//!                         ▼
//!                   ExecutingTool ──▶ ToolResultSent ──▶ Done
//! ```
//!
//! At most one tool call is executed per turn: the first invocation naming a
//! registered tool. Tool failures are reported to the model as a structured
//! result; model failures abort the turn.

use std::sync::Arc;

use crate::error::Result;
use crate::message::Message;
use crate::provider::{Completion, FinishReason, GenerationOptions, LlmProvider};
use crate::tool::{ToolCall, ToolContext, ToolRegistry, ToolResult};

/// Output cap for the follow-up call that answers a tool result
pub const DEFAULT_FOLLOW_UP_MAX_TOKENS: u32 = 400;

/// Driver configuration
#[derive(Clone, Debug)]
pub struct ProtocolConfig {
    /// Options for the first model call
    pub generation: GenerationOptions,

    /// Output cap for the follow-up call after a tool ran
    pub follow_up_max_tokens: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            generation: GenerationOptions::default(),
            follow_up_max_tokens: DEFAULT_FOLLOW_UP_MAX_TOKENS,
        }
    }
}

/// States of a single turn
#[derive(Debug)]
pub enum ProtocolState {
    /// History and tool declarations are ready to send
    AwaitingModel,

    /// The first model reply has arrived
    ModelResponded(Completion),

    /// A tool invocation was selected and is being executed
    ExecutingTool {
        reply: Completion,
        call: ToolCall,
    },

    /// The tool result was sent back and the follow-up reply has arrived
    ToolResultSent {
        result: ToolResult,
        follow_up: Completion,
    },

    /// Terminal state
    Done(TurnOutcome),
}

impl ProtocolState {
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolState::AwaitingModel => "awaiting_model",
            ProtocolState::ModelResponded(_) => "model_responded",
            ProtocolState::ExecutingTool { .. } => "executing_tool",
            ProtocolState::ToolResultSent { .. } => "tool_result_sent",
            ProtocolState::Done(_) => "done",
        }
    }
}

/// Final answer of a turn
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    /// Assistant text to show and persist
    pub content: String,

    /// Finish reason of the call that produced `content`
    pub finish_reason: Option<FinishReason>,

    /// Result of the tool executed during the turn, if any
    pub tool_result: Option<ToolResult>,
}

/// Runs the model / tool / model sequence for one turn
pub struct ToolCallDriver {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: ProtocolConfig,
}

impl ToolCallDriver {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: ProtocolConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Drive `history` (system prompt included) to a final answer
    pub async fn run(&self, history: &[Message], ctx: &ToolContext) -> Result<TurnOutcome> {
        let mut state = ProtocolState::AwaitingModel;

        loop {
            state = match state {
                ProtocolState::Done(outcome) => {
                    tracing::debug!(session = %ctx.session_id, "Turn complete");
                    return Ok(outcome);
                }
                current => {
                    let next = self.step(current, history, ctx).await?;
                    tracing::debug!(session = %ctx.session_id, state = next.name(), "Protocol transition");
                    next
                }
            };
        }
    }

    /// Advance one transition
    pub async fn step(
        &self,
        state: ProtocolState,
        history: &[Message],
        ctx: &ToolContext,
    ) -> Result<ProtocolState> {
        match state {
            ProtocolState::AwaitingModel => {
                let schemas = self.tools.schemas();
                let reply = self
                    .provider
                    .complete(history, &schemas, &self.config.generation)
                    .await?;
                Ok(ProtocolState::ModelResponded(reply))
            }

            ProtocolState::ModelResponded(reply) => {
                if reply.tool_calls.len() > 1 {
                    tracing::debug!(
                        requested = reply.tool_calls.len(),
                        "Model requested several tools, only the first registered one runs"
                    );
                }

                let selected = reply
                    .tool_calls
                    .iter()
                    .find(|call| self.tools.contains(&call.name))
                    .cloned();

                Ok(match selected {
                    Some(call) => ProtocolState::ExecutingTool { reply, call },
                    None => ProtocolState::Done(TurnOutcome {
                        content: reply.text_or_empty().to_string(),
                        finish_reason: reply.finish_reason,
                        tool_result: None,
                    }),
                })
            }

            ProtocolState::ExecutingTool { reply, call } => {
                tracing::info!(tool = %call.name, session = %ctx.session_id, "Executing tool");
                let result = self.execute_tool(ctx, &call).await;

                let mut follow_up_history = history.to_vec();
                follow_up_history.push(Message::assistant_tool_calls(
                    reply.text_or_empty(),
                    vec![call.clone()],
                ));
                follow_up_history.push(Message::tool(
                    result.payload().to_string(),
                    call.name.clone(),
                    call.id.clone(),
                ));

                let options = self
                    .config
                    .generation
                    .clone()
                    .with_max_tokens(self.config.follow_up_max_tokens);

                let follow_up = self
                    .provider
                    .complete(&follow_up_history, &[], &options)
                    .await?;

                Ok(ProtocolState::ToolResultSent { result, follow_up })
            }

            ProtocolState::ToolResultSent { result, follow_up } => {
                Ok(ProtocolState::Done(TurnOutcome {
                    content: follow_up.text_or_empty().to_string(),
                    finish_reason: follow_up.finish_reason,
                    tool_result: Some(result),
                }))
            }

            done @ ProtocolState::Done(_) => Ok(done),
        }
    }

    /// Execute a tool call, folding any error into a failure result
    async fn execute_tool(&self, ctx: &ToolContext, call: &ToolCall) -> ToolResult {
        match self.tools.execute(ctx, call).await {
            Ok(result) => result.with_call_id(call.id.clone()),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolResult::failure(call.name.clone(), e.to_string()).with_call_id(call.id.clone())
            }
        }
    }
}
