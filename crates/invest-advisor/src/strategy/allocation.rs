//! Allocation Engine
//!
//! Deterministic split of a monthly net surplus into equity and savings, and
//! of the equity portion into direct stocks, mutual funds and debt.
//!
//! ```text
//! risk appetite ──▶ RiskClass ──▶ equity% / savings%
//!                                    │
//! liabilities, horizon ─────────────▶ direct stocks% / mutual funds% / debt%
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Risk class derived from free-text risk appetite
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskClass {
    Aggressive,
    Moderate,
    Conservative,
}

impl RiskClass {
    /// Case-insensitive prefix classification; anything unrecognised is Conservative
    pub fn classify(risk_appetite: &str) -> Self {
        let risk = risk_appetite.trim_start().to_lowercase();
        if risk.starts_with("aggr") {
            RiskClass::Aggressive
        } else if risk.starts_with("mod") {
            RiskClass::Moderate
        } else {
            RiskClass::Conservative
        }
    }

    /// Base (equity %, savings %) split
    pub fn base_split(self) -> (u32, u32) {
        match self {
            RiskClass::Aggressive => (85, 15),
            RiskClass::Moderate => (60, 40),
            RiskClass::Conservative => (30, 70),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskClass::Aggressive => "Aggressive",
            RiskClass::Moderate => "Moderate",
            RiskClass::Conservative => "Conservative",
        }
    }
}

/// Sub-allocation of the equity portion, in percent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquitySplit {
    pub direct_stocks: u32,
    pub mutual_funds: u32,
    pub debt: u32,
}

impl EquitySplit {
    pub const BALANCED: Self = Self::new(50, 30, 20);
    pub const GROWTH: Self = Self::new(70, 20, 10);
    pub const DEFENSIVE: Self = Self::new(30, 40, 30);

    pub const fn new(direct_stocks: u32, mutual_funds: u32, debt: u32) -> Self {
        Self {
            direct_stocks,
            mutual_funds,
            debt,
        }
    }
}

/// Result of the allocation calculation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub risk_class: RiskClass,
    pub equity_pct: u32,
    pub savings_pct: u32,
    pub funds_equity: Decimal,
    pub funds_savings: Decimal,
    pub equity_split: EquitySplit,
}

impl Allocation {
    /// One-line description, e.g. "Equity: 85% / Savings: 15%"
    pub fn describe(&self) -> String {
        format!("Equity: {}% / Savings: {}%", self.equity_pct, self.savings_pct)
    }
}

/// Round to cents, ties to even
pub(crate) fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// `pct` percent of `amount`, rounded to cents. `pct` is at most 100.
///
/// Scales before dividing unless the product would overflow, in which case
/// the division happens first.
pub(crate) fn percent_of(amount: Decimal, pct: u32) -> Decimal {
    let pct = Decimal::from(pct);
    let share = amount
        .checked_mul(pct)
        .map_or_else(|| amount / dec!(100) * pct, |scaled| scaled / dec!(100));
    round_cents(share)
}

/// Compute the allocation for a risk appetite, outstanding liabilities,
/// investment horizon and monthly net surplus.
///
/// Savings are derived by subtraction, so `funds_equity + funds_savings`
/// always equals `net_surplus` exactly. Inputs are not validated.
pub fn compute_allocation(
    risk_appetite: &str,
    liabilities: Decimal,
    investment_period_years: u32,
    net_surplus: Decimal,
) -> Allocation {
    let risk_class = RiskClass::classify(risk_appetite);
    let (equity_pct, savings_pct) = risk_class.base_split();

    let funds_equity = percent_of(net_surplus, equity_pct);
    let funds_savings = net_surplus - funds_equity;

    let low_threshold = net_surplus * dec!(0.2);
    let medium_threshold = net_surplus * dec!(0.5);
    let low_liabilities = if net_surplus > Decimal::ZERO {
        liabilities <= low_threshold
    } else {
        liabilities <= Decimal::ZERO
    };
    let medium_liabilities = liabilities > low_threshold && liabilities <= medium_threshold;

    // The last check runs after the first two and may override either.
    let mut equity_split = EquitySplit::BALANCED;
    if risk_class == RiskClass::Aggressive && low_liabilities {
        equity_split = EquitySplit::GROWTH;
    } else if risk_class == RiskClass::Moderate || medium_liabilities {
        equity_split = EquitySplit::BALANCED;
    }
    if risk_class == RiskClass::Conservative || investment_period_years < 2 {
        equity_split = EquitySplit::DEFENSIVE;
    }

    Allocation {
        risk_class,
        equity_pct,
        savings_pct,
        funds_equity,
        funds_savings,
        equity_split,
    }
}
