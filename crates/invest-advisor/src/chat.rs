//! Chat Orchestrator
//!
//! One conversational turn:
//!
//! ```text
//! request ──▶ ensure session ──▶ log transcript ──▶ control command? ──yes──▶ market lookup
//!                                                        │ no
//!                                                        ▼
//!                                   system prompt + history ──▶ ToolCallDriver ──▶ log reply
//! ```

use std::sync::Arc;

use agent_core::{
    FinishReason, LlmProvider, Message, Role, SessionId, ToolCallDriver, ToolContext,
    ToolRegistry,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::command::ControlCommand;
use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::market::MarketAdapter;
use crate::store::RecordStore;
use crate::svckit::UpdatePortfolioTool;

/// Roles a client may send. Tool messages are only produced by the driver,
/// which pairs them with the originating call id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    System,
    User,
    Assistant,
}

impl From<ClientRole> for Role {
    fn from(role: ClientRole) -> Self {
        match role {
            ClientRole::System => Role::System,
            ClientRole::User => Role::User,
            ClientRole::Assistant => Role::Assistant,
        }
    }
}

/// Message as exchanged with the client
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ClientRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ClientRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Inbound turn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnRequest {
    pub messages: Vec<ChatMessage>,

    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl TurnRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            session_id: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Outbound turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub content: String,

    #[serde(rename = "sessionId")]
    pub session_id: String,

    pub finish_reason: Option<String>,
}

/// Composes the store, market lookup and model into a chat turn. Holds no
/// per-session state, so clones can serve requests concurrently.
#[derive(Clone)]
pub struct ChatOrchestrator {
    provider: Option<Arc<dyn LlmProvider>>,
    store: Arc<dyn RecordStore>,
    market: MarketAdapter,
    tools: Arc<ToolRegistry>,
    config: Arc<AdvisorConfig>,
}

impl ChatOrchestrator {
    /// Build an orchestrator with `UpdatePortfolioTool` registered against
    /// `store`. Without a provider, conversational turns fail with a
    /// configuration error; control commands still work.
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        store: Arc<dyn RecordStore>,
        market: MarketAdapter,
        config: AdvisorConfig,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(UpdatePortfolioTool::new(store.clone()).with_anchor(config.anchor.clone()));

        Self {
            provider,
            store,
            market,
            tools: Arc::new(tools),
            config: Arc::new(config),
        }
    }

    /// Whether a provider is configured and passes its health check
    pub async fn provider_ready(&self) -> bool {
        let Some(provider) = &self.provider else {
            return false;
        };
        match provider.health_check().await {
            Ok(ready) => ready,
            Err(e) => {
                tracing::warn!(provider = %provider.info().name, error = %e, "Provider health check failed");
                false
            }
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn market(&self) -> &MarketAdapter {
        &self.market
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Process one turn
    pub async fn handle_turn(&self, request: TurnRequest) -> Result<TurnResponse> {
        let session = self.store.ensure_session(request.session_id.as_deref()).await?;

        let transcript = serde_json::to_string(&request.messages)?;
        self.log_message(&session, Role::User, &transcript).await;

        let command = request
            .messages
            .last()
            .and_then(|m| ControlCommand::parse(&m.content));
        if let Some(ControlCommand::FetchTopStocks { sector }) = command {
            tracing::info!(session = %session, sector = %sector, "Fetching top stocks");
            let lookup = self.market.lookup_top_five(&sector).await;
            return Ok(TurnResponse {
                content: json!({ "marketTopStocks": lookup.picks }).to_string(),
                session_id: session.to_string(),
                finish_reason: Some(FinishReason::Tool.as_str().to_string()),
            });
        }

        let provider = self.provider.clone().ok_or_else(|| {
            AdvisorError::Config(
                "AZURE_OPENAI_ENDPOINT, AZURE_OPENAI_API_KEY and AZURE_OPENAI_DEPLOYMENT must be set".into(),
            )
        })?;

        let history: Vec<Message> = std::iter::once(Message::system(self.config.system_prompt.clone()))
            .chain(request.messages.iter().map(|m| Message::new(m.role.into(), m.content.clone())))
            .collect();

        let driver = ToolCallDriver::new(
            provider,
            self.tools.clone(),
            self.config.protocol_for(request.temperature, request.max_tokens),
        );
        let outcome = driver
            .run(&history, &ToolContext::new(session.clone()))
            .await
            .inspect_err(|e| tracing::error!(session = %session, error = %e, "Turn aborted"))?;

        if let Some(result) = &outcome.tool_result {
            tracing::info!(session = %session, tool = %result.name, success = result.is_success(), "Tool executed");
        }

        self.log_message(&session, Role::Assistant, &outcome.content).await;

        Ok(TurnResponse {
            content: outcome.content,
            session_id: session.to_string(),
            finish_reason: outcome.finish_reason.map(|r| r.as_str().to_string()),
        })
    }

    async fn log_message(&self, session: &SessionId, role: Role, content: &str) {
        if let Err(e) = self.store.append_message(session, role, content).await {
            tracing::warn!(session = %session, role = role.as_str(), error = %e, "Failed to record message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;
    use crate::testing::{RejectingStore, UnavailableStore};
    use agent_core::mock::ScriptedProvider;
    use agent_core::{AgentError, Completion, ToolCall};
    use serde_json::Value;

    fn orchestrator(
        provider: Option<Arc<ScriptedProvider>>,
        store: Arc<dyn RecordStore>,
    ) -> ChatOrchestrator {
        ChatOrchestrator::new(
            provider.map(|p| p as Arc<dyn LlmProvider>),
            store,
            MarketAdapter::curated_only(),
            AdvisorConfig::default(),
        )
    }

    fn user(text: &str) -> ChatMessage {
        ChatMessage::new(ClientRole::User, text)
    }

    fn portfolio_call() -> Completion {
        Completion::tool_calls(vec![ToolCall::new(
            "call_9",
            "UpdatePortfolioTool",
            r#"{"userName":"Asha","region":"Mumbai","riskAppetite":"Aggressive","totalDebt":0,"investmentAmount":1000,"investmentPeriod":5,"preferredSector":"tech"}"#,
        )])
    }

    #[tokio::test]
    async fn test_plain_turn() {
        let provider = Arc::new(ScriptedProvider::new(vec![Completion::text("Hello! What's your name?")]));
        let store = Arc::new(MemoryRecordStore::new());
        let chat = orchestrator(Some(provider.clone()), store.clone());

        let response = chat.handle_turn(TurnRequest::new(vec![user("Hi")])).await.unwrap();

        assert_eq!(response.content, "Hello! What's your name?");
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.session_id.len(), 32);

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert_eq!(requests[0].messages[1].content, "Hi");
        assert_eq!(requests[0].tool_names, ["UpdatePortfolioTool"]);
        assert_eq!(requests[0].options.max_tokens, 800);

        let log = store.messages(&SessionId::from_string(&response.session_id)).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].role, Role::User);
        let logged: Value = serde_json::from_str(&log[0].content).unwrap();
        assert_eq!(logged[0]["content"], "Hi");
        assert_eq!(log[1].content, "Hello! What's your name?");
    }

    #[tokio::test]
    async fn test_request_options_forwarded() {
        let provider = Arc::new(ScriptedProvider::new(vec![Completion::text("ok")]));
        let chat = orchestrator(Some(provider.clone()), Arc::new(MemoryRecordStore::new()));

        let mut request = TurnRequest::new(vec![user("Hi")]).with_session("existing");
        request.temperature = Some(0.7);
        request.max_tokens = Some(100);
        let response = chat.handle_turn(request).await.unwrap();

        assert_eq!(response.session_id, "existing");
        let requests = provider.requests().await;
        let options = &requests[0].options;
        assert_eq!(options.max_tokens, 100);
        assert!((options.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_fetch_top_stocks_skips_model() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let store = Arc::new(MemoryRecordStore::new());
        let chat = orchestrator(Some(provider.clone()), store.clone());

        let response = chat
            .handle_turn(TurnRequest::new(vec![user("Hi"), user("  #fetch-top-stocks: IT ")]))
            .await
            .unwrap();

        assert_eq!(response.finish_reason.as_deref(), Some("tool"));
        let body: Value = serde_json::from_str(&response.content).unwrap();
        let picks = body["marketTopStocks"].as_array().unwrap();
        assert_eq!(picks.len(), 4);
        assert_eq!(picks[0], serde_json::json!({ "symbol": "TCS" }));
        assert!(provider.requests().await.is_empty());

        // Only the inbound transcript is recorded
        let log = store.messages(&SessionId::from_string(&response.session_id)).await.unwrap();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_top_stocks_without_provider() {
        let chat = orchestrator(None, Arc::new(MemoryRecordStore::new()));

        let response = chat
            .handle_turn(TurnRequest::new(vec![user("#fetch-top-stocks:unknown-sector")]))
            .await
            .unwrap();

        assert_eq!(response.content, r#"{"marketTopStocks":[]}"#);
    }

    #[tokio::test]
    async fn test_missing_provider_is_config_error() {
        let store = Arc::new(MemoryRecordStore::new());
        let chat = orchestrator(None, store.clone());

        let err = chat
            .handle_turn(TurnRequest::new(vec![user("Hi")]).with_session("s1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AdvisorError::Config(_)));
        // The transcript was still recorded before the failure
        assert_eq!(store.messages(&SessionId::from_string("s1")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_round_trip_stores_one_portfolio() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            portfolio_call(),
            Completion::text("We have created your portfolio."),
        ]));
        let store = Arc::new(MemoryRecordStore::new());
        let chat = orchestrator(Some(provider.clone()), store.clone());

        let response = chat
            .handle_turn(TurnRequest::new(vec![user("Yes, that looks right")]).with_session("s2"))
            .await
            .unwrap();

        assert_eq!(response.content, "We have created your portfolio.");

        let session = SessionId::from_string("s2");
        let portfolios = store.portfolios(&session).await.unwrap();
        assert_eq!(portfolios.len(), 1);
        assert_eq!(portfolios[0].portfolio.computed_allocation.equity_pct, 85);

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 2);
        assert!(requests[1].tool_names.is_empty());
        assert_eq!(requests[1].options.max_tokens, 400);

        let tool_message = requests[1].messages.last().unwrap();
        assert_eq!(tool_message.role, Role::Tool);
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_9"));
        let payload: Value = serde_json::from_str(&tool_message.content).unwrap();
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["message"], "Portfolio updated");

        let log = store.messages(&session).await.unwrap();
        assert_eq!(log.last().unwrap().content, "We have created your portfolio.");
    }

    #[tokio::test]
    async fn test_store_failure_reported_to_model() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            portfolio_call(),
            Completion::text("Sorry, I couldn't save that."),
        ]));
        let chat = orchestrator(Some(provider.clone()), Arc::new(RejectingStore));

        let response = chat
            .handle_turn(TurnRequest::new(vec![user("Save it")]))
            .await
            .unwrap();

        assert_eq!(response.content, "Sorry, I couldn't save that.");
        let requests = provider.requests().await;
        let payload: Value =
            serde_json::from_str(&requests[1].messages.last().unwrap().content).unwrap();
        assert_eq!(payload["status"], "error");
        assert!(payload["message"].as_str().unwrap().contains("disk full"));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let provider = Arc::new(ScriptedProvider::from_results(vec![Err(
            AgentError::ProviderUnavailable("timed out".into()),
        )]));
        let chat = orchestrator(Some(provider), Arc::new(MemoryRecordStore::new()));

        let err = chat.handle_turn(TurnRequest::new(vec![user("Hi")])).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Agent(AgentError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn test_session_store_failure_aborts() {
        let provider = Arc::new(ScriptedProvider::new(vec![Completion::text("unused")]));
        let chat = orchestrator(Some(provider.clone()), Arc::new(UnavailableStore));

        let err = chat.handle_turn(TurnRequest::new(vec![user("Hi")])).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Store(_)));
        assert!(provider.requests().await.is_empty());
    }

    #[test]
    fn test_wire_names() {
        let request: TurnRequest = serde_json::from_str(
            r#"{"messages":[{"role":"user","content":"hi"}],"sessionId":"abc","max_tokens":50}"#,
        )
        .unwrap();
        assert_eq!(request.session_id.as_deref(), Some("abc"));
        assert_eq!(request.max_tokens, Some(50));
        assert_eq!(request.temperature, None);

        let response = TurnResponse {
            content: "x".into(),
            session_id: "abc".into(),
            finish_reason: Some("stop".into()),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["finish_reason"], "stop");
    }

    #[test]
    fn test_client_roles_exclude_tool() {
        let ok: TurnRequest = serde_json::from_value(json!({
            "messages": [
                { "role": "system", "content": "s" },
                { "role": "assistant", "content": "a" },
                { "role": "user", "content": "u" }
            ]
        }))
        .unwrap();
        assert_eq!(ok.messages[1].role, ClientRole::Assistant);

        let rejected = serde_json::from_value::<TurnRequest>(json!({
            "messages": [{ "role": "tool", "content": "{}" }]
        }));
        assert!(rejected.is_err());
    }

    #[tokio::test]
    async fn test_history_roles_forwarded() {
        let provider = Arc::new(ScriptedProvider::new(vec![Completion::text("ok")]));
        let chat = orchestrator(Some(provider.clone()), Arc::new(MemoryRecordStore::new()));

        chat.handle_turn(TurnRequest::new(vec![
            user("Hi"),
            ChatMessage::new(ClientRole::Assistant, "Hello"),
            user("Go on"),
        ]))
        .await
        .unwrap();

        let requests = provider.requests().await;
        let roles: Vec<Role> = requests[0].messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::System, Role::User, Role::Assistant, Role::User]);
    }

    #[tokio::test]
    async fn test_provider_ready() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        assert!(!orchestrator(None, store.clone()).provider_ready().await);

        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        assert!(orchestrator(Some(provider), store).provider_ready().await);
    }
}
