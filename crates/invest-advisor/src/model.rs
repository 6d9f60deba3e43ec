//! Persisted records: sessions, transcript messages and portfolios

use agent_core::{Role, SessionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::strategy::{Allocation, compute_allocation};

/// Optional profile details gathered during the conversation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub currency_symbol: Option<String>,
    pub monthly_inflow: Option<Decimal>,
    pub monthly_outflow: Option<Decimal>,
    pub liabilities: Option<Decimal>,
    pub risk_appetite: Option<String>,
    pub preferred_sector: Option<String>,
    pub future_goals: Option<String>,
    pub investment_horizon_years: Option<u32>,
    pub net_surplus: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: SessionId,
    #[serde(default)]
    pub profile: SessionProfile,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            profile: SessionProfile::default(),
            created_at: Utc::now(),
        }
    }
}

/// One transcript entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: u64,
    pub session_id: SessionId,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Portfolio fields supplied by the model, plus the allocation computed on
/// the server from the same inputs
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub user_name: String,
    pub user_email: String,
    pub region: String,
    pub monthly_inflow: Decimal,
    pub monthly_outflow: Decimal,
    pub total_debt: Decimal,
    pub risk_appetite: String,
    pub preferred_sector: String,
    pub investment_amount: Decimal,
    pub investment_period: u32,
    pub future_goals: String,
    pub asset_allocation: String,
    pub equity_recommendation: String,
    pub alternate_equities: String,
    pub debt_recommendation: String,
    pub portfolio_summary: String,
    pub computed_allocation: Allocation,
}

impl NewPortfolio {
    /// Build from tool arguments. Missing or ill-typed fields fall back to
    /// empty strings and zero.
    pub fn from_arguments(args: &Map<String, Value>) -> Self {
        let risk_appetite = string_arg(args, "riskAppetite");
        let total_debt = decimal_arg(args, "totalDebt");
        let investment_amount = decimal_arg(args, "investmentAmount");
        let investment_period = period_arg(args, "investmentPeriod");

        let computed_allocation =
            compute_allocation(&risk_appetite, total_debt, investment_period, investment_amount);

        Self {
            user_name: string_arg(args, "userName"),
            user_email: string_arg(args, "userEmail"),
            region: string_arg(args, "region"),
            monthly_inflow: decimal_arg(args, "monthlyInflow"),
            monthly_outflow: decimal_arg(args, "monthlyOutflow"),
            total_debt,
            risk_appetite,
            preferred_sector: string_arg(args, "preferredSector"),
            investment_amount,
            investment_period,
            future_goals: string_arg(args, "futureGoals"),
            asset_allocation: string_arg(args, "assetAllocation"),
            equity_recommendation: string_arg(args, "equityRecommendation"),
            alternate_equities: string_arg(args, "alternateEquities"),
            debt_recommendation: string_arg(args, "debtRecommendation"),
            portfolio_summary: string_arg(args, "portfolioSummary"),
            computed_allocation,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRecord {
    pub id: u64,
    pub session_id: SessionId,
    pub portfolio: NewPortfolio,
    pub created_at: DateTime<Utc>,
}

fn string_arg(args: &Map<String, Value>, key: &str) -> String {
    match args.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn decimal_arg(args: &Map<String, Value>, key: &str) -> Decimal {
    let parsed = match args.get(key) {
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s),
        _ => None,
    };
    parsed.unwrap_or_default()
}

fn period_arg(args: &Map<String, Value>, key: &str) -> u32 {
    let years = decimal_arg(args, key);
    if years.is_sign_negative() {
        0
    } else {
        years.trunc().to_u32().unwrap_or(u32::MAX)
    }
}
