//! Configuration management for the oracle
//!
//! Loads defaults, optional `config/default` and `config/local` files and
//! `TRADEOGRE_ORACLE__*` environment variables (via .env as well)

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::types::TradingPair;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub oracle: OracleConfig,
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Exchange API host
    pub host: String,
    /// HTTPS port
    pub port: u16,
    /// Thinly traded asset, priced through the history feed
    pub asset: String,
    /// Liquid asset the history feed is quoted in
    pub quote: String,
    /// Stablecoin the ticker feed is quoted in
    pub stable: String,
}

impl OracleConfig {
    /// Pair read from the history feed (e.g. MWC-BTC)
    pub fn history_pair(&self) -> TradingPair {
        TradingPair::new(&self.asset, &self.quote)
    }

    /// Pair read from the ticker feed (e.g. BTC-USDT)
    pub fn ticker_pair(&self) -> TradingPair {
        TradingPair::new(&self.quote, &self.stable)
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            host: "tradeogre.com".to_string(),
            port: 443,
            asset: "MWC".to_string(),
            quote: "BTC".to_string(),
            stable: "USDT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Proxy for every exchange connection, e.g. socks5h://127.0.0.1:9050
    pub proxy_url: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl TransportConfig {
    /// Configured proxy, ignoring blank values from the environment
    pub fn proxy(&self) -> Option<&str> {
        self.proxy_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            proxy_url: None,
            timeout_ms: 30_000,
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter, overridden by RUST_LOG
    pub filter: String,
    /// Emit JSON lines instead of human-readable logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::builder()?
            // Override with environment variables (TRADEOGRE_ORACLE__*)
            .add_source(Environment::with_prefix("TRADEOGRE_ORACLE").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    fn builder() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>> {
        let oracle = OracleConfig::default();
        let transport = TransportConfig::default();
        let logging = LoggingConfig::default();

        let builder = Config::builder()
            // Oracle defaults
            .set_default("oracle.host", oracle.host)?
            .set_default("oracle.port", i64::from(oracle.port))?
            .set_default("oracle.asset", oracle.asset)?
            .set_default("oracle.quote", oracle.quote)?
            .set_default("oracle.stable", oracle.stable)?
            // Transport defaults
            .set_default("transport.timeout_ms", i64::try_from(transport.timeout_ms)?)?
            .set_default("transport.user_agent", transport.user_agent)?
            // Logging defaults
            .set_default("logging.filter", logging.filter)?
            .set_default("logging.json", logging.json)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        Ok(builder)
    }

    /// Reject values that would produce unusable requests
    pub fn validate(&self) -> Result<()> {
        if self.oracle.host.trim().is_empty() {
            bail!("oracle.host must not be empty");
        }
        if self.oracle.port == 0 {
            bail!("oracle.port must not be 0");
        }
        for pair in [self.oracle.history_pair(), self.oracle.ticker_pair()] {
            if !pair.is_valid() {
                bail!("Trading pair {pair} must consist of ASCII letters and digits");
            }
        }
        if self.transport.timeout_ms == 0 {
            bail!("transport.timeout_ms must be greater than 0");
        }
        Ok(())
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        format!(
            "host={}:{} history={} ticker={} proxy={} timeout_ms={}",
            self.oracle.host,
            self.oracle.port,
            self.oracle.history_pair(),
            self.oracle.ticker_pair(),
            if self.transport.proxy().is_some() { "on" } else { "off" },
            self.transport.timeout_ms
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            oracle: OracleConfig::default(),
            transport: TransportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
