//! Advisor configuration

use agent_core::{GenerationOptions, ProtocolConfig, protocol::DEFAULT_FOLLOW_UP_MAX_TOKENS};

use crate::ADVISOR_PROMPT;
use crate::strategy::DEFAULT_ANCHOR;

#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    /// Prompt prepended to every model call
    pub system_prompt: String,

    /// Defaults for requests that omit temperature or max tokens
    pub generation: GenerationOptions,

    /// Output cap for the reply that follows a tool result
    pub follow_up_max_tokens: u32,

    /// Anchor holding in direct-stock distributions
    pub anchor: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            system_prompt: ADVISOR_PROMPT.into(),
            generation: GenerationOptions::default(),
            follow_up_max_tokens: DEFAULT_FOLLOW_UP_MAX_TOKENS,
            anchor: DEFAULT_ANCHOR.into(),
        }
    }
}

impl AdvisorConfig {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Protocol settings for one turn, applying per-request overrides
    pub fn protocol_for(&self, temperature: Option<f32>, max_tokens: Option<u32>) -> ProtocolConfig {
        ProtocolConfig {
            generation: GenerationOptions {
                temperature: temperature.unwrap_or(self.generation.temperature),
                max_tokens: max_tokens.unwrap_or(self.generation.max_tokens),
            },
            follow_up_max_tokens: self.follow_up_max_tokens,
        }
    }
}
