//! Oracle module - exchange price derived from two market-data feeds
//!
//! Combines the trade history of a thinly traded pair with the ticker of a
//! liquid pair into a single stablecoin-denominated price.

pub mod decimal;
mod history;
mod ticker;
mod tradeogre;

pub use history::{extract_latest_trade, LatestTrade};
pub use ticker::{extract_ticker, TickerPrice};
pub use tradeogre::{compute_price, TradeOgreOracle};

use async_trait::async_trait;
use std::fmt;

use crate::error::Result;
use crate::types::PriceQuote;

/// Trait for price oracles consumed by the aggregation layer
#[async_trait]
pub trait PriceOracle: Send {
    /// Get the oracle name
    fn name(&self) -> &'static str;

    /// Fetch both feeds and compute a fresh price
    async fn get_new_price(&mut self) -> Result<PriceQuote>;
}

/// Market-data feed an oracle reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    /// Trade history of the thinly traded pair
    History,
    /// Ticker of the liquid pair
    Ticker,
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::History => write!(f, "history feed"),
            Feed::Ticker => write!(f, "ticker feed"),
        }
    }
}
