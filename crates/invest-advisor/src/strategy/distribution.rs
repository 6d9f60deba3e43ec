//! Direct-stock distribution
//!
//! Splits the direct-stock share of the equity funds between an anchor holding
//! and a list of alternates. The anchor takes 40%; the rest is shared equally.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allocation::{percent_of, round_cents};

/// Anchor holding used when no other is configured
pub const DEFAULT_ANCHOR: &str = "Cognizant (CTS)";

const ANCHOR_PCT: u32 = 40;

/// Amount assigned to one holding
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShare {
    pub name: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDistribution {
    /// Total amount routed to direct stocks
    pub direct_total: Decimal,
    pub anchor: StockShare,
    pub alternates: Vec<StockShare>,
}

impl StockDistribution {
    /// Sum of every share; equals `direct_total`
    pub fn total(&self) -> Decimal {
        self.anchor.amount + self.alternates.iter().map(|s| s.amount).sum::<Decimal>()
    }
}

/// Distribute `direct_stocks_pct` percent of `funds_equity` between `anchor`
/// and `alternates`.
///
/// Each part is rounded to cents and the last alternate absorbs the rounding
/// residue. With no alternates the anchor receives the whole direct total.
pub fn distribute_direct_stocks<S: AsRef<str>>(
    funds_equity: Decimal,
    direct_stocks_pct: u32,
    anchor: &str,
    alternates: &[S],
) -> StockDistribution {
    let direct_total = percent_of(funds_equity, direct_stocks_pct);

    if alternates.is_empty() {
        return StockDistribution {
            direct_total,
            anchor: StockShare {
                name: anchor.to_string(),
                amount: direct_total,
            },
            alternates: Vec::new(),
        };
    }

    let anchor_amount = percent_of(direct_total, ANCHOR_PCT);
    let remainder = direct_total - anchor_amount;
    let each = round_cents(remainder / Decimal::from(alternates.len()));

    let mut shares: Vec<StockShare> = alternates
        .iter()
        .map(|name| StockShare {
            name: name.as_ref().to_string(),
            amount: each,
        })
        .collect();

    let assigned = each * Decimal::from(shares.len());
    if let Some(last) = shares.last_mut() {
        last.amount += remainder - assigned;
    }

    StockDistribution {
        direct_total,
        anchor: StockShare {
            name: anchor.to_string(),
            amount: anchor_amount,
        },
        alternates: shares,
    }
}
