//! Ticker feed
//!
//! `/api/v1/ticker/<BASE>-<QUOTE>` returns a single JSON object:
//!
//! ```json
//! {"success":true,"initialprice":"64000.00","price":"65000.50","high":"65500.00","low":"63900.00","volume":"12.3","bid":"64990.00","ask":"65010.00"}
//! ```

use serde_json::Value;

use crate::error::{OracleError, Result};
use crate::oracle::decimal::{DecimalValue, PrecisionBudget};
use crate::oracle::Feed;

const FEED: Feed = Feed::Ticker;

/// Last price of the ticker feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerPrice {
    pub price: DecimalValue,
    /// Fractional digits of the price literal
    pub precision: PrecisionBudget,
}

/// Validates a ticker response and extracts its last price.
pub fn extract_ticker(body: &[u8]) -> Result<TickerPrice> {
    let document: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(feed = %FEED, error = %e, "Response is not valid JSON");
        OracleError::MalformedResponse { feed: FEED }
    })?;

    let success = document.get("success").and_then(Value::as_bool);
    let price = document.get("price").and_then(Value::as_str);
    let (Some(true), Some(price)) = (success, price) else {
        return Err(OracleError::InvalidShape {
            feed: FEED,
            detail: "expected a successful ticker with a string price",
        });
    };

    let value = DecimalValue::parse_positive(price).map_err(|e| OracleError::InvalidField {
        feed: FEED,
        field: "price",
        reason: e.into(),
    })?;

    Ok(TickerPrice {
        price: value,
        precision: PrecisionBudget::of_literal(price),
    })
}
