//! Azure AI Search market index client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{MarketSearch, StockPick};
use crate::error::{AdvisorError, Result};

const SEARCH_API_VERSION: &str = "2023-11-01";

#[derive(Clone, Debug)]
pub struct AzureSearchConfig {
    /// Service endpoint, e.g. `https://my-search.search.windows.net`
    pub endpoint: String,
    pub api_key: String,
    pub index: String,
    pub timeout_secs: u64,
}

impl AzureSearchConfig {
    pub const DEFAULT_INDEX: &'static str = "market-index";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            index: Self::DEFAULT_INDEX.into(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read `AZURE_SEARCH_ENDPOINT`, `AZURE_SEARCH_API_KEY` and optionally
    /// `AZURE_SEARCH_INDEX`
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let (Some(endpoint), Some(api_key)) = (var("AZURE_SEARCH_ENDPOINT"), var("AZURE_SEARCH_API_KEY")) else {
            return Err(AdvisorError::Config(
                "AZURE_SEARCH_ENDPOINT and AZURE_SEARCH_API_KEY are required for market search".into(),
            ));
        };

        let mut config = Self::new(endpoint, api_key);
        if let Some(index) = var("AZURE_SEARCH_INDEX") {
            config.index = index;
        }
        Ok(config)
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.index,
            SEARCH_API_VERSION
        )
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    orderby: &'static str,
    top: usize,
    select: &'static str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    symbol: Option<String>,
    name: Option<String>,
    performance_score: Option<f64>,
}

impl SearchHit {
    fn into_pick(self) -> Option<StockPick> {
        let symbol = self
            .symbol
            .filter(|s| !s.is_empty())
            .or_else(|| self.name.filter(|n| !n.is_empty()))?;
        Some(StockPick {
            symbol,
            score: self.performance_score,
        })
    }
}

/// Ranks index documents by `performanceScore`
pub struct AzureSearchClient {
    client: Client,
    config: AzureSearchConfig,
}

impl AzureSearchClient {
    pub fn new(config: AzureSearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(AzureSearchConfig::from_env()?)
    }
}

#[async_trait]
impl MarketSearch for AzureSearchClient {
    async fn top_stocks(&self, sector: &str, limit: usize) -> Result<Vec<StockPick>> {
        let request = SearchRequest {
            search: sector,
            orderby: "performanceScore desc",
            top: limit,
            select: "symbol,name,performanceScore,sector",
        };

        let response = self
            .client
            .post(self.config.search_url())
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Search(format!("{status}: {body}")));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .value
            .into_iter()
            .filter_map(SearchHit::into_pick)
            .take(limit)
            .collect())
    }

    fn name(&self) -> &str {
        "azure-ai-search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AzureSearchClient {
        AzureSearchClient::new(AzureSearchConfig::new(server.uri(), "search-key")).unwrap()
    }

    #[test]
    fn test_search_url() {
        let config = AzureSearchConfig::new("https://svc.search.windows.net/", "k");
        assert_eq!(
            config.search_url(),
            "https://svc.search.windows.net/indexes/market-index/docs/search?api-version=2023-11-01"
        );
    }

    #[tokio::test]
    async fn test_maps_hits_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/market-index/docs/search"))
            .and(query_param("api-version", "2023-11-01"))
            .and(header("api-key", "search-key"))
            .and(body_partial_json(json!({ "search": "tech", "top": 5, "orderby": "performanceScore desc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    { "symbol": "TCS", "name": "Tata Consultancy", "performanceScore": 9.1 },
                    { "name": "Infosys", "performanceScore": 8.7 },
                    { "performanceScore": 8.0 },
                    { "symbol": "WIPRO" }
                ]
            })))
            .mount(&server)
            .await;

        let picks = client_for(&server).top_stocks("tech", 5).await.unwrap();

        assert_eq!(picks.len(), 3);
        assert_eq!(picks[0], StockPick { symbol: "TCS".into(), score: Some(9.1) });
        assert_eq!(picks[1].symbol, "Infosys");
        assert_eq!(picks[2], StockPick { symbol: "WIPRO".into(), score: None });
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client_for(&server).top_stocks("tech", 5).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Search(msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        assert!(client_for(&server).top_stocks("tech", 5).await.is_err());
    }
}
