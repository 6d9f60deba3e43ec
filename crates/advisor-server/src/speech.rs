//! Speech service credentials for the browser client
//!
//! Issues short-lived speech tokens and relays avatar TURN credentials so the
//! subscription key never leaves the server.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Lifetime the speech service grants issued tokens
pub const TOKEN_TTL_SECS: u64 = 600;

#[derive(Error, Debug)]
pub enum SpeechError {
    /// The speech service answered with an error status
    #[error("Speech service returned {status}")]
    Upstream {
        status: StatusCode,
        content_type: Option<String>,
        body: String,
    },

    #[error("Speech service unreachable: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Clone, Debug)]
pub struct SpeechConfig {
    pub key: String,
    pub region: String,
    pub token_url: String,
    pub relay_url: String,
    pub timeout_secs: u64,
}

impl SpeechConfig {
    pub const DEFAULT_REGION: &'static str = "eastus2";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

    pub fn new(key: impl Into<String>, region: impl Into<String>) -> Self {
        let region = region.into();
        Self {
            key: key.into(),
            token_url: format!("https://{region}.api.cognitive.microsoft.com/sts/v1.0/issueToken"),
            relay_url: format!(
                "https://{region}.tts.speech.microsoft.com/cognitiveservices/avatar/relay/token/v1"
            ),
            region,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `SPEECH_KEY` and `SPEECH_REGION`. `None` when no key is set.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let key = var("SPEECH_KEY")?;
        let region = var("SPEECH_REGION").unwrap_or_else(|| Self::DEFAULT_REGION.into());
        Some(Self::new(key, region))
    }

    /// Point both calls at another host
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.token_url = format!("{base}/sts/v1.0/issueToken");
        self.relay_url = format!("{base}/cognitiveservices/avatar/relay/token/v1");
        self
    }
}

/// Browser speech token
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechToken {
    pub token: String,
    pub region: String,
    pub expires_in_seconds: u64,
}

pub struct SpeechClient {
    client: Client,
    config: SpeechConfig,
}

impl SpeechClient {
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    /// Exchange the subscription key for a short-lived token
    pub async fn issue_token(&self) -> Result<SpeechToken, SpeechError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.key)
            .header(reqwest::header::CONTENT_LENGTH, "0")
            .send()
            .await?;

        let response = Self::check(response).await?;
        Ok(SpeechToken {
            token: response.text().await?,
            region: self.config.region.clone(),
            expires_in_seconds: TOKEN_TTL_SECS,
        })
    }

    /// Avatar relay credentials (ICE urls, username, credential), passed
    /// through unchanged
    pub async fn relay_token(&self) -> Result<Value, SpeechError> {
        let response = self
            .client
            .get(&self.config.relay_url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.config.key)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, "Speech service rejected request");
        Err(SpeechError::Upstream {
            status,
            content_type,
            body,
        })
    }
}
