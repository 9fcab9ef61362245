//! Core types shared by the oracle, transport and binary
//!
//! Defines the traded pairs and the price quote handed to the aggregation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A traded pair as the exchange names it in its API paths (e.g. `MWC-BTC`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    /// Asset being priced
    pub base: String,
    /// Asset the price is expressed in
    pub quote: String,
}

impl TradingPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Exchange symbol, `BASE-QUOTE`
    pub fn symbol(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }

    /// Both legs are non-empty ASCII alphanumerics, so the symbol is safe to
    /// splice into a URL path.
    pub fn is_valid(&self) -> bool {
        is_symbol(&self.base) && is_symbol(&self.quote)
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

fn is_symbol(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Price produced by one oracle evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Time of the most recent trade, never later than the evaluation time
    pub timestamp: DateTime<Utc>,
    /// Canonical decimal string (no trailing fractional zeros, no dangling point)
    pub price: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_format() {
        let pair = TradingPair::new("MWC", "BTC");
        assert_eq!(pair.symbol(), "MWC-BTC");
        assert_eq!(pair.to_string(), "MWC-BTC");
    }

    #[test]
    fn test_symbol_validation() {
        assert!(TradingPair::new("BTC", "USDT").is_valid());
        assert!(!TradingPair::new("", "USDT").is_valid());
        assert!(!TradingPair::new("BTC", "US/DT").is_valid());
        assert!(!TradingPair::new("B TC", "USDT").is_valid());
    }

    #[test]
    fn test_quote_serializes_rfc3339() {
        let quote = PriceQuote {
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            price: "802.10617".to_string(),
        };
        let json = serde_json::to_string(&quote).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":"2023-11-14T22:13:20Z","price":"802.10617"}"#
        );
    }
}
