//! Application State

use std::sync::Arc;

use invest_advisor::ChatOrchestrator;

use crate::speech::SpeechClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Chat turns, market lookup and the record store
    pub chat: ChatOrchestrator,

    /// Speech credentials proxy (None if not configured)
    pub speech: Option<Arc<SpeechClient>>,
}
