//! Azure OpenAI LLM Provider
//!
//! Implementation of `LlmProvider` for an Azure OpenAI chat deployment with
//! function calling.

mod wire;

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::Message,
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ProviderInfo, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use wire::{ChatRequest, ChatResponse, WireFunction, WireMessage, WireToolCall};

/// Azure OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,

    /// API key sent in the `api-key` header
    pub api_key: String,

    /// REST API version
    pub api_version: String,

    /// Chat deployment name
    pub deployment: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl AzureOpenAiConfig {
    pub const DEFAULT_API_VERSION: &'static str = "2024-10-01-preview";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: Self::DEFAULT_API_VERSION.into(),
            deployment: deployment.into(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_API_KEY`,
    /// `AZURE_OPENAI_DEPLOYMENT` and optionally `AZURE_OPENAI_API_VERSION`
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let missing: Vec<&str> = ["AZURE_OPENAI_ENDPOINT", "AZURE_OPENAI_API_KEY", "AZURE_OPENAI_DEPLOYMENT"]
            .into_iter()
            .filter(|name| var(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AgentError::Config(format!(
                "Azure OpenAI is not configured (missing {})",
                missing.join(", ")
            )));
        }

        let mut config = Self::new(
            var("AZURE_OPENAI_ENDPOINT").unwrap_or_default(),
            var("AZURE_OPENAI_API_KEY").unwrap_or_default(),
            var("AZURE_OPENAI_DEPLOYMENT").unwrap_or_default(),
        );
        if let Some(version) = var("AZURE_OPENAI_API_VERSION") {
            config.api_version = version;
        }
        Ok(config)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

/// Azure OpenAI LLM provider
pub struct AzureOpenAiProvider {
    client: Client,
    config: AzureOpenAiConfig,
}

impl AzureOpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: AzureOpenAiConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty()
            || config.api_key.trim().is_empty()
            || config.deployment.trim().is_empty()
        {
            return Err(AgentError::Config(
                "Azure OpenAI endpoint, API key and deployment are required".into(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(AzureOpenAiConfig::from_env()?)
    }

    /// Convert agent messages to the wire format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str().to_string(),
                content: Some(m.content.clone()),
                name: m.name.clone(),
                tool_calls: m.has_tool_calls().then(|| {
                    m.tool_calls
                        .iter()
                        .map(|call| WireToolCall {
                            id: call.id.clone(),
                            kind: "function".into(),
                            function: WireFunction {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect()
                }),
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Convert the service response to an agent completion
    fn convert_completion(response: ChatResponse, deployment: &str) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Parse("response contained no choices".into()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|c| ToolCall::new(c.id, c.function.name, c.function.arguments))
            .collect();

        Ok(Completion {
            content: choice.message.content,
            tool_calls,
            model: response.model.unwrap_or_else(|| deployment.to_string()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_wire),
        })
    }

    fn map_send_error(&self, e: &reqwest::Error) -> AgentError {
        if e.is_timeout() {
            AgentError::ProviderUnavailable(format!(
                "request timed out after {}s",
                self.config.timeout_secs
            ))
        } else if e.is_connect() {
            AgentError::ProviderUnavailable(e.to_string())
        } else {
            AgentError::Provider(e.to_string())
        }
    }

    fn map_status(status: StatusCode, body: String) -> AgentError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(body),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(body),
            s if s.is_server_error() => AgentError::ProviderUnavailable(format!("{}: {}", s, body)),
            s => AgentError::Provider(format!("{}: {}", s, body)),
        }
    }
}

#[async_trait]
impl LlmProvider for AzureOpenAiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "AzureOpenAI".into(),
            model: self.config.deployment.clone(),
            supports_tools: true,
        }
    }

    async fn health_check(&self) -> Result<bool> {
        // Configuration is validated at construction; no cheap probe endpoint exists.
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatRequest {
            messages: Self::convert_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            tools: tools.iter().map(ToolSchema::to_function_declaration).collect(),
        };

        tracing::debug!(
            deployment = %self.config.deployment,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Calling Azure OpenAI"
        );

        let response = self
            .client
            .post(self.config.chat_url())
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Azure OpenAI error response");
            return Err(Self::map_status(status, body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(format!("chat completion body: {}", e)))?;

        Self::convert_completion(body, &self.config.deployment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tool::ParameterSchema;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> AzureOpenAiProvider {
        AzureOpenAiProvider::from_config(AzureOpenAiConfig::new(server.uri(), "test-key", "gpt-4o"))
            .unwrap()
    }

    fn portfolio_schema() -> ToolSchema {
        ToolSchema {
            name: "UpdatePortfolioTool".into(),
            description: "Persist portfolio".into(),
            parameters: vec![ParameterSchema::required("userName", "string", "Name")],
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = AzureOpenAiConfig::new("https://x.openai.azure.com/", "k", "gpt");
        assert_eq!(config.api_version, "2024-10-01-preview");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(
            config.chat_url(),
            "https://x.openai.azure.com/openai/deployments/gpt/chat/completions?api-version=2024-10-01-preview"
        );
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let result = AzureOpenAiProvider::from_config(AzureOpenAiConfig::new("https://x", "", "gpt"));
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[tokio::test]
    async fn test_info_names_deployment() {
        let provider = AzureOpenAiProvider::from_config(AzureOpenAiConfig::new("https://x", "k", "gpt-4o")).unwrap();
        let info = provider.info();
        assert_eq!(info.name, "AzureOpenAI");
        assert_eq!(info.model, "gpt-4o");
        assert!(provider.health_check().await.unwrap());
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            Message::system("You are helpful."),
            Message::assistant_tool_calls("", vec![ToolCall::new("call_1", "UpdatePortfolioTool", "{}")]),
            Message::tool(r#"{"status":"success"}"#, "UpdatePortfolioTool", "call_1"),
        ];

        let converted = AzureOpenAiProvider::convert_messages(&messages);
        assert_eq!(converted.len(), 3);
        assert!(converted[0].tool_calls.is_none());
        assert_eq!(converted[1].tool_calls.as_ref().unwrap()[0].kind, "function");
        assert_eq!(converted[2].role, "tool");
        assert_eq!(converted[2].tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_complete_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt-4o/chat/completions"))
            .and(query_param("api-version", "2024-10-01-preview"))
            .and(header("api-key", "test-key"))
            .and(body_partial_json(json!({"max_tokens": 800})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "gpt-4o-2024-08-06",
                "choices": [{
                    "index": 0,
                    "finish_reason": "tool_calls",
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc",
                            "type": "function",
                            "function": {"name": "UpdatePortfolioTool", "arguments": "{\"userName\":\"Asha\"}"}
                        }]
                    }
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .complete(&[Message::user("save")], &[portfolio_schema()], &GenerationOptions::default())
            .await
            .unwrap();

        assert!(completion.content.is_none());
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].id, "call_abc");
        assert_eq!(completion.tool_calls[0].arguments, "{\"userName\":\"Asha\"}");
        assert_eq!(completion.usage.unwrap().total_tokens, 15);

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "UpdatePortfolioTool");
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_complete_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"finish_reason": "stop", "message": {"role": "assistant", "content": "Hi there"}}]
            })))
            .mount(&server)
            .await;

        let completion = provider_for(&server)
            .complete(&[Message::user("hi")], &[], &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(completion.text_or_empty(), "Hi there");
        assert!(completion.tool_calls.is_empty());
        assert_eq!(completion.model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&[Message::user("hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::RateLimited(ref body) if body == "slow down"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(&[Message::user("hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }
}
