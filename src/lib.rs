//! TradeOgre price oracle
//!
//! Derives a stablecoin price for a thinly traded asset from two TradeOgre
//! market-data feeds and hands it to a multi-source aggregator.

pub mod config;
pub mod error;
pub mod oracle;
pub mod transport;
pub mod types;

pub use error::{OracleError, Result};
pub use oracle::{PriceOracle, TradeOgreOracle};
pub use types::{PriceQuote, TradingPair};
