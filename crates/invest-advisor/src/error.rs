//! Error Types for the Investment Advisor

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Required credentials or endpoints are missing
    #[error("Configuration error: {0}")]
    Config(String),

    /// The record store rejected or could not complete an operation
    #[error("Store error: {0}")]
    Store(String),

    /// Market search returned an error response
    #[error("Search error: {0}")]
    Search(String),

    /// Model call or tool machinery failed
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AdvisorError::Config(_) => "The advisory service is not configured.".into(),
            AdvisorError::Store(_) => "Your conversation could not be saved. Please try again.".into(),
            AdvisorError::Agent(e) => e.user_message(),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
