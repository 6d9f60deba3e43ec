//! Region inference and currency formatting

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::strategy::allocation::round_cents;

/// Country and currency inferred from a free-text location
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    India,
    UnitedStates,
    UnitedKingdom,
    EuropeanUnion,
}

const INDIA: &[&str] = &[
    "mumbai", "delhi", "bangalore", "bengaluru", "hyderabad", "chennai", "pune", "kolkata",
    "india",
];
const UNITED_STATES: &[&str] = &[
    "new york", "san francisco", "austin", "seattle", "chicago", "los angeles",
    "united states",
];
const UNITED_KINGDOM: &[&str] = &["london", "manchester", "united kingdom"];
const EUROPE: &[&str] = &["paris", "lyon", "berlin", "madrid", "rome", "europe"];

impl Region {
    /// Infer the region from a city or country name. Unknown locations map
    /// to the United States.
    pub fn infer(location: &str) -> Self {
        let location = location.to_lowercase();
        let contains_any = |keys: &[&str]| keys.iter().any(|k| location.contains(k));

        if contains_any(INDIA) {
            Region::India
        } else if contains_any(UNITED_STATES) || has_word(&location, "usa") {
            Region::UnitedStates
        } else if contains_any(UNITED_KINGDOM) || has_word(&location, "uk") {
            Region::UnitedKingdom
        } else if contains_any(EUROPE) {
            Region::EuropeanUnion
        } else {
            Region::UnitedStates
        }
    }

    pub fn country(self) -> &'static str {
        match self {
            Region::India => "India",
            Region::UnitedStates => "United States",
            Region::UnitedKingdom => "United Kingdom",
            Region::EuropeanUnion => "European Union",
        }
    }

    pub fn currency_symbol(self) -> &'static str {
        match self {
            Region::India => "₹",
            Region::UnitedStates => "$",
            Region::UnitedKingdom => "£",
            Region::EuropeanUnion => "€",
        }
    }

    pub fn format(self, amount: Decimal) -> String {
        format_currency(amount, self.currency_symbol())
    }
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}

/// Format `amount` as `{symbol}1,234,567.80`. Negative amounts render as
/// `-{symbol}…`.
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    let mut rounded = round_cents(amount.abs());
    rounded.rescale(2);
    let text = rounded.to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{cents}")
}
