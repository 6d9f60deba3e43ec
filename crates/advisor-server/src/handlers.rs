//! HTTP Handlers

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use invest_advisor::{AdvisorError, StockPick, TurnRequest, TurnResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::speech::{SpeechError, SpeechToken};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub deps: DependencyStatus,
}

#[derive(Debug, Serialize)]
pub struct DependencyStatus {
    pub aoai: bool,
    pub speech: bool,
    pub store: bool,
    pub search: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    pub sector: String,
}

#[derive(Debug, Serialize)]
pub struct MarketResponse {
    pub sector: String,
    pub top5: Vec<StockPick>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Error rendered as `{error, code}` with a matching status
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    code: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            code,
        }
    }

    fn speech_not_configured() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "CONFIG_ERROR",
            "SPEECH_KEY and SPEECH_REGION must be set.",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.error,
                code: self.code.into(),
            }),
        )
            .into_response()
    }
}

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        let message = err.user_message();
        match &err {
            AdvisorError::Config(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", message)
            }
            AdvisorError::Store(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR", message)
            }
            AdvisorError::Agent(e) if e.is_upstream() => {
                Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message)
            }
            AdvisorError::Agent(agent_core::AgentError::Config(_)) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", message)
            }
            AdvisorError::Search(_) | AdvisorError::Network(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message)
            }
            AdvisorError::Agent(_) | AdvisorError::Serialization(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "AGENT_ERROR", message)
            }
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Innoviya API (invest-soul)",
    })
}

/// Liveness probe
pub async fn healthy() -> Json<StatusResponse> {
    Json(StatusResponse { status: "healthy" })
}

/// Health with configured-dependency flags
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        deps: DependencyStatus {
            aoai: state.chat.provider_ready().await,
            speech: state.speech.is_some(),
            store: true,
            search: state.chat.market().has_search(),
        },
    })
}

/// One chat turn
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let response = state.chat.handle_turn(request).await.map_err(|e| {
        tracing::error!(error = %e, "Chat turn failed");
        ApiError::from(e)
    })?;
    Ok(Json(response))
}

/// Top five stocks for a sector
pub async fn market_top_stocks(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> Json<MarketResponse> {
    let lookup = state.chat.market().lookup_top_five(&query.sector).await;
    Json(MarketResponse {
        sector: lookup.sector,
        top5: lookup.picks,
    })
}

/// Short-lived browser speech token
pub async fn speech_token(State(state): State<AppState>) -> Result<Json<SpeechToken>, ApiError> {
    let speech = state.speech.as_ref().ok_or_else(ApiError::speech_not_configured)?;

    speech.issue_token().await.map(Json).map_err(|e| match e {
        SpeechError::Upstream { status, body, .. } => ApiError::new(
            status,
            "SPEECH_ERROR",
            format!("Failed to issue token: {body}"),
        ),
        SpeechError::Network(e) => {
            tracing::error!(error = %e, "Speech token request failed");
            ApiError::new(StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
        }
    })
}

/// Avatar relay credentials. Upstream errors are mirrored as-is.
pub async fn avatar_relay_token(State(state): State<AppState>) -> Result<Response, ApiError> {
    let speech = state.speech.as_ref().ok_or_else(ApiError::speech_not_configured)?;

    match speech.relay_token().await {
        Ok(credentials) => Ok(Json::<Value>(credentials).into_response()),
        Err(SpeechError::Upstream {
            status,
            content_type,
            body,
        }) => {
            let content_type = content_type.unwrap_or_else(|| "text/plain".into());
            Ok((status, [(header::CONTENT_TYPE, content_type)], body).into_response())
        }
        Err(SpeechError::Network(e)) => {
            tracing::error!(error = %e, "Avatar relay request failed");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SPEECH_ERROR",
                e.to_string(),
            ))
        }
    }
}
