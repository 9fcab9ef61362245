//! TradeOgre oracle
//!
//! Fetches both feeds once and prints the resulting price as a JSON line on
//! stdout. Logs go to stderr.

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tradeogre_oracle::config::{AppConfig, LoggingConfig};
use tradeogre_oracle::transport::HttpTransport;
use tradeogre_oracle::{PriceOracle, TradeOgreOracle};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging);

    info!(config = %config, "Starting TradeOgre oracle");

    let transport = HttpTransport::new(&config.transport)?;
    let mut oracle = TradeOgreOracle::new(transport, &config.oracle);

    let quote = match oracle.get_new_price().await {
        Ok(quote) => quote,
        Err(e) => {
            error!(oracle = oracle.name(), feed = ?e.feed(), error = %e, "Price evaluation failed");
            return Err(e).context("TradeOgre oracle failed");
        }
    };

    println!("{}", serde_json::to_string(&quote)?);
    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
