//! Update Portfolio Tool
//!
//! Persists the finalized portfolio the model has assembled, together with
//! the allocation the server computes from the same inputs.

use std::sync::Arc;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolContext, ToolResult, ToolSchema,
    tool::ParameterSchema,
};
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::market::curated_top;
use crate::model::NewPortfolio;
use crate::region::Region;
use crate::store::RecordStore;
use crate::strategy::{DEFAULT_ANCHOR, distribute_direct_stocks};

pub const UPDATE_PORTFOLIO_TOOL: &str = "UpdatePortfolioTool";

/// Tool that stores a finalized portfolio
pub struct UpdatePortfolioTool {
    store: Arc<dyn RecordStore>,
    anchor: String,
}

impl UpdatePortfolioTool {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            anchor: DEFAULT_ANCHOR.to_string(),
        }
    }

    /// Override the anchor holding of the direct-stock distribution
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }

    /// Server-side figures returned to the model alongside the status
    fn summarize(&self, portfolio: &NewPortfolio) -> Value {
        let allocation = &portfolio.computed_allocation;
        let region = Region::infer(&portfolio.region);

        let mut data = json!({
            "allocation": allocation,
            "description": allocation.describe(),
            "country": region.country(),
            "currencySymbol": region.currency_symbol(),
            "formatted": {
                "equity": region.format(allocation.funds_equity),
                "savings": region.format(allocation.funds_savings),
            },
        });

        let alternates = curated_top(&portfolio.preferred_sector);
        if !alternates.is_empty() {
            let distribution = distribute_direct_stocks(
                allocation.funds_equity,
                allocation.equity_split.direct_stocks,
                &self.anchor,
                alternates,
            );
            if let Some(obj) = data.as_object_mut() {
                obj.insert("distribution".into(), json!(distribution));
            }
        }

        data
    }
}

#[async_trait]
impl Tool for UpdatePortfolioTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: UPDATE_PORTFOLIO_TOOL.into(),
            description: "Persist portfolio to the advisory record store and return status.".into(),
            parameters: vec![
                ParameterSchema::required("userName", "string", "Full name of the investor"),
                ParameterSchema::optional("userEmail", "string", "Email address of the investor"),
                ParameterSchema::required("region", "string", "City or country the investor lives in"),
                ParameterSchema::required("monthlyInflow", "number", "Monthly income"),
                ParameterSchema::required("monthlyOutflow", "number", "Monthly expenses"),
                ParameterSchema::required("totalDebt", "number", "Outstanding liabilities"),
                ParameterSchema::required("riskAppetite", "string", "Aggressive, Moderate or Conservative"),
                ParameterSchema::required("preferredSector", "string", "Sector the investor prefers"),
                ParameterSchema::required("investmentAmount", "number", "Monthly amount available to invest"),
                ParameterSchema::required("investmentPeriod", "number", "Investment horizon in years"),
                ParameterSchema::required("futureGoals", "string", "Goals the investment should serve"),
                ParameterSchema::required("assetAllocation", "string", "Equity / savings split, e.g. 'Equity: 85% / Savings: 15%'"),
                ParameterSchema::required("equityRecommendation", "string", "Recommended direct equities and amounts"),
                ParameterSchema::required("alternateEquities", "string", "Alternate equities in the preferred sector"),
                ParameterSchema::required("debtRecommendation", "string", "Recommended debt instruments"),
                ParameterSchema::required("portfolioSummary", "string", "Short summary of the whole portfolio"),
            ],
        }
    }

    async fn execute(&self, ctx: &ToolContext, call: &ToolCall) -> CoreResult<ToolResult> {
        let args = call.parsed_arguments();
        let portfolio = NewPortfolio::from_arguments(&args);
        let mut data = self.summarize(&portfolio);

        match self.store.create_portfolio(&ctx.session_id, portfolio).await {
            Ok(record) => {
                if let Some(obj) = data.as_object_mut() {
                    obj.insert("portfolioId".into(), json!(record.id));
                }
                Ok(ToolResult::success(UPDATE_PORTFOLIO_TOOL, "Portfolio updated")
                    .with_data(data)
                    .with_call_id(&call.id))
            }
            Err(e) => {
                tracing::warn!(session = %ctx.session_id, error = %e, "Portfolio was not stored");
                Ok(ToolResult::failure(UPDATE_PORTFOLIO_TOOL, e.to_string()).with_call_id(&call.id))
            }
        }
    }
}
