use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as a human-readable string with two decimal places.
/// Example: 50 -> "50.00", -12.345 -> "-12.35"
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Format an amount followed by the shop currency symbol.
pub fn format_money(amount: Decimal, currency: &str) -> String {
    format!("{} {}", format_amount(amount), currency)
}

/// Parse a user-supplied decimal string into an amount.
/// Example: "50.00" -> 50, "12.5" -> 12.5, ".50" -> 0.5, "1,5" -> 1.5
pub fn parse_amount(input: &str) -> Result<Decimal, ParseAmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    // Shops on a French/Arabic keyboard layout type a comma as decimal separator
    let normalized = input.replace(',', ".");
    let normalized = if normalized.starts_with('.') {
        format!("0{}", normalized)
    } else if let Some(rest) = normalized.strip_prefix("-.") {
        format!("-0.{}", rest)
    } else {
        normalized
    };

    Decimal::from_str(&normalized).map_err(|_| ParseAmountError::InvalidFormat(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat(String),
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "empty amount"),
            ParseAmountError::InvalidFormat(raw) => write!(f, "invalid amount '{}'", raw),
        }
    }
}

impl std::error::Error for ParseAmountError {}
