//! TradeOgre price oracle
//!
//! Prices the thinly traded asset in the stablecoin by multiplying the last
//! trade of `<ASSET>-<QUOTE>` with the ticker price of `<QUOTE>-<STABLE>`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::OracleConfig;
use crate::error::{OracleError, Result};
use crate::oracle::decimal::canonicalize;
use crate::oracle::{
    extract_latest_trade, extract_ticker, Feed, LatestTrade, PriceOracle, TickerPrice,
};
use crate::transport::{RequestSpec, Transport};
use crate::types::{PriceQuote, TradingPair};

const NAME: &str = "TradeOgre";

pub struct TradeOgreOracle<T> {
    transport: T,
    host: String,
    port: u16,
    history_pair: TradingPair,
    ticker_pair: TradingPair,
}

impl<T: Transport> TradeOgreOracle<T> {
    pub fn new(transport: T, config: &OracleConfig) -> Self {
        Self {
            transport,
            host: config.host.clone(),
            port: config.port,
            history_pair: config.history_pair(),
            ticker_pair: config.ticker_pair(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn history_request(&self) -> RequestSpec {
        RequestSpec::new(
            &self.host,
            self.port,
            format!("/api/v1/history/{}", self.history_pair.symbol()),
        )
    }

    pub fn ticker_request(&self) -> RequestSpec {
        RequestSpec::new(
            &self.host,
            self.port,
            format!("/api/v1/ticker/{}", self.ticker_pair.symbol()),
        )
    }

    /// Prepares both requests, then executes them in one transport call.
    ///
    /// A construction failure discards whatever was already queued.
    async fn fetch(&mut self) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut handles = Vec::with_capacity(2);
        for (feed, request) in [
            (Feed::History, self.history_request()),
            (Feed::Ticker, self.ticker_request()),
        ] {
            match self.transport.prepare(&request) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    tracing::warn!(
                        oracle = NAME,
                        feed = %feed,
                        request = %request,
                        error = %e,
                        "Creating request failed"
                    );
                    self.transport.reset();
                    return Err(OracleError::RequestConstruction { feed });
                }
            }
        }

        let mut responses = self.transport.execute_all().await.map_err(|e| {
            tracing::warn!(oracle = NAME, error = %e, "Performing requests failed");
            OracleError::Transport { exchange: NAME }
        })?;

        let history = responses.take(handles[0]);
        let ticker = responses.take(handles[1]);
        if history.is_empty() || ticker.is_empty() {
            tracing::warn!(
                oracle = NAME,
                history_bytes = history.len(),
                ticker_bytes = ticker.len(),
                "Empty response body"
            );
            return Err(OracleError::Transport { exchange: NAME });
        }

        Ok((history, ticker))
    }
}

#[async_trait]
impl<T: Transport> PriceOracle for TradeOgreOracle<T> {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn get_new_price(&mut self) -> Result<PriceQuote> {
        let (history, ticker) = self.fetch().await?;

        let quote = compute_price(&history, &ticker, Utc::now())?;

        tracing::info!(
            oracle = NAME,
            history = %self.history_pair,
            ticker = %self.ticker_pair,
            price = %quote.price,
            timestamp = %quote.timestamp,
            "New price"
        );

        Ok(quote)
    }
}

/// Validates both response bodies and combines them into a price.
///
/// `now` bounds the reported trade time.
pub fn compute_price(history: &[u8], ticker: &[u8], now: DateTime<Utc>) -> Result<PriceQuote> {
    let trade = extract_latest_trade(history, now)?;
    let ticker = extract_ticker(ticker)?;
    compose(trade, ticker)
}

fn compose(trade: LatestTrade, ticker: TickerPrice) -> Result<PriceQuote> {
    let product = trade
        .price
        .checked_mul(&ticker.price)
        .ok_or(OracleError::Computation("product exceeds the working precision"))?;
    if !product.is_positive() {
        return Err(OracleError::Computation("non-positive result"));
    }

    let precision = trade.precision + ticker.precision;
    let rendered = product
        .to_fixed(precision.digits())
        .map_err(OracleError::Formatting)?;

    Ok(PriceQuote {
        timestamp: trade.timestamp,
        price: canonicalize(&rendered).to_string(),
    })
}
