//! Trade history feed
//!
//! The exchange answers `/api/v1/history/<BASE>-<QUOTE>` with a JSON array of
//! trades, oldest first:
//!
//! ```json
//! [{"date":1700000000,"type":"sell","price":"0.01234","quantity":"10"}]
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{FieldError, OracleError, Result};
use crate::oracle::decimal::{DecimalValue, PrecisionBudget};
use crate::oracle::Feed;

const FEED: Feed = Feed::History;

/// Most recent trade of the history feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestTrade {
    /// Trade time, clamped to the evaluation time
    pub timestamp: DateTime<Utc>,
    pub price: DecimalValue,
    /// Fractional digits of the price literal
    pub precision: PrecisionBudget,
}

/// Validates a history response and extracts its last trade.
///
/// The last array element is used regardless of the dates of earlier
/// elements. A trade dated after `now` is reported at `now`.
pub fn extract_latest_trade(body: &[u8], now: DateTime<Utc>) -> Result<LatestTrade> {
    let document: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(feed = %FEED, error = %e, "Response is not valid JSON");
        OracleError::MalformedResponse { feed: FEED }
    })?;

    let Some(latest) = document.as_array().and_then(|trades| trades.last()) else {
        return Err(OracleError::InvalidShape {
            feed: FEED,
            detail: "expected a non-empty array of trades",
        });
    };

    let (Some(date), Some(price)) = (
        latest.get("date").and_then(Value::as_i64),
        latest.get("price").and_then(Value::as_str),
    ) else {
        return Err(OracleError::InvalidShape {
            feed: FEED,
            detail: "most recent trade needs an integer date and a string price",
        });
    };

    let timestamp = DateTime::from_timestamp(date, 0).ok_or(OracleError::InvalidField {
        feed: FEED,
        field: "date",
        reason: FieldError::OutOfRange(date),
    })?;
    if timestamp > now {
        tracing::debug!(feed = %FEED, date, "Trade is dated in the future, using current time");
    }

    let value = DecimalValue::parse_positive(price).map_err(|e| OracleError::InvalidField {
        feed: FEED,
        field: "price",
        reason: e.into(),
    })?;

    Ok(LatestTrade {
        timestamp: timestamp.min(now),
        price: value,
        precision: PrecisionBudget::of_literal(price),
    })
}
