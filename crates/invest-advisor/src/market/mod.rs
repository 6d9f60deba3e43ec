//! Market Lookup
//!
//! Top performers for a sector. A live search backend is preferred; when it
//! is missing, empty or failing the curated table answers instead.

mod azure_search;
pub mod curated;

pub use azure_search::{AzureSearchClient, AzureSearchConfig};
pub use curated::{curated_top, normalize_sector};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of picks returned by a lookup
pub const TOP_N: usize = 5;

/// One ranked stock
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockPick {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl StockPick {
    pub fn symbol_only(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            score: None,
        }
    }
}

/// Search backend trait (Strategy pattern)
#[async_trait]
pub trait MarketSearch: Send + Sync {
    /// Up to `limit` picks for `sector`, best first
    async fn top_stocks(&self, sector: &str, limit: usize) -> Result<Vec<StockPick>>;

    fn name(&self) -> &str;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupSource {
    Search,
    Curated,
}

/// Result of a sector lookup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketLookup {
    pub sector: String,
    pub picks: Vec<StockPick>,
    pub source: LookupSource,
}

/// Search with curated fallback
#[derive(Clone, Default)]
pub struct MarketAdapter {
    search: Option<Arc<dyn MarketSearch>>,
}

impl MarketAdapter {
    pub fn new(search: Option<Arc<dyn MarketSearch>>) -> Self {
        Self { search }
    }

    /// Curated table only
    pub fn curated_only() -> Self {
        Self::default()
    }

    pub fn with_search(search: Arc<dyn MarketSearch>) -> Self {
        Self::new(Some(search))
    }

    pub fn has_search(&self) -> bool {
        self.search.is_some()
    }

    /// Top five for `sector`. Never fails: search problems are logged and
    /// answered from the curated table.
    pub async fn lookup_top_five(&self, sector: &str) -> MarketLookup {
        if let Some(search) = &self.search {
            match search.top_stocks(sector, TOP_N).await {
                Ok(picks) if !picks.is_empty() => {
                    return MarketLookup {
                        sector: sector.to_string(),
                        picks: picks.into_iter().take(TOP_N).collect(),
                        source: LookupSource::Search,
                    };
                }
                Ok(_) => {
                    tracing::warn!(backend = search.name(), sector, "Market search returned no hits, using curated list");
                }
                Err(e) => {
                    tracing::warn!(backend = search.name(), sector, error = %e, "Market search failed, using curated list");
                }
            }
        }

        MarketLookup {
            sector: sector.to_string(),
            picks: curated_top(sector).iter().map(|s| StockPick::symbol_only(*s)).collect(),
            source: LookupSource::Curated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdvisorError;

    struct FixedSearch(Result<Vec<StockPick>>);

    #[async_trait]
    impl MarketSearch for FixedSearch {
        async fn top_stocks(&self, _sector: &str, _limit: usize) -> Result<Vec<StockPick>> {
            match &self.0 {
                Ok(picks) => Ok(picks.clone()),
                Err(e) => Err(AdvisorError::Search(e.to_string())),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_curated_without_search() {
        let lookup = MarketAdapter::curated_only().lookup_top_five("IT").await;

        assert_eq!(lookup.source, LookupSource::Curated);
        assert_eq!(lookup.sector, "IT");
        let symbols: Vec<_> = lookup.picks.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, ["TCS", "Infosys", "HCL Tech", "LTIMindtree"]);
        assert!(lookup.picks.iter().all(|p| p.score.is_none()));
    }

    #[tokio::test]
    async fn test_unknown_sector_is_empty() {
        let lookup = MarketAdapter::curated_only().lookup_top_five("unknown-sector").await;
        assert!(lookup.picks.is_empty());
    }

    #[tokio::test]
    async fn test_search_hits_preferred() {
        let picks: Vec<_> = (0..7)
            .map(|i| StockPick { symbol: format!("S{i}"), score: Some(f64::from(10 - i)) })
            .collect();
        let adapter = MarketAdapter::with_search(Arc::new(FixedSearch(Ok(picks))));

        let lookup = adapter.lookup_top_five("tech").await;
        assert_eq!(lookup.source, LookupSource::Search);
        assert_eq!(lookup.picks.len(), TOP_N);
        assert_eq!(lookup.picks[0].symbol, "S0");
    }

    #[tokio::test]
    async fn test_fallback_on_empty_or_error() {
        let empty = MarketAdapter::with_search(Arc::new(FixedSearch(Ok(vec![]))));
        let lookup = empty.lookup_top_five("finance").await;
        assert_eq!(lookup.source, LookupSource::Curated);
        assert_eq!(lookup.picks.len(), 4);

        let failing = MarketAdapter::with_search(Arc::new(FixedSearch(Err(AdvisorError::Search(
            "boom".into(),
        )))));
        let lookup = failing.lookup_top_five("energy").await;
        assert_eq!(lookup.source, LookupSource::Curated);
        assert_eq!(lookup.picks[0].symbol, "Reliance Industries");
    }

    #[test]
    fn test_fallback_pick_omits_score() {
        let json = serde_json::to_value(StockPick::symbol_only("TCS")).unwrap();
        assert_eq!(json, serde_json::json!({ "symbol": "TCS" }));
    }
}
