//! HTTPS transport backed by reqwest
//!
//! Queued requests run concurrently. An optional proxy (typically a local Tor
//! SOCKS port, `socks5h://127.0.0.1:9050`) carries every connection.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, Proxy, Request, Url};
use std::time::Duration;

use crate::config::TransportConfig;
use crate::transport::{RequestHandle, RequestSpec, Responses, Transport};

pub struct HttpTransport {
    client: Client,
    pending: Vec<Request>,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.as_str());

        if let Some(proxy_url) = config.proxy() {
            tracing::info!(proxy = %proxy_url, "Routing exchange requests through proxy");
            builder = builder.proxy(Proxy::all(proxy_url).context("Invalid proxy URL")?);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            pending: Vec::new(),
        })
    }

    async fn fetch(client: &Client, request: Request) -> Result<Vec<u8>> {
        let path = request.url().path().to_string();

        let response = client
            .execute(request)
            .await
            .with_context(|| format!("Request to {path} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{path} returned {status}");
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read {path} response body"))?;

        Ok(body.to_vec())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn prepare(&mut self, request: &RequestSpec) -> Result<RequestHandle> {
        let url = Url::parse(&request.url())
            .with_context(|| format!("Invalid request URL for {request}"))?;

        let request = self
            .client
            .get(url)
            .build()
            .context("Failed to build request")?;

        self.pending.push(request);
        Ok(RequestHandle::new(self.pending.len() - 1))
    }

    async fn execute_all(&mut self) -> Result<Responses> {
        let requests = std::mem::take(&mut self.pending);
        let total = requests.len();
        let client = &self.client;

        let results = join_all(
            requests
                .into_iter()
                .map(|request| Self::fetch(client, request)),
        )
        .await;

        let mut bodies = Vec::with_capacity(total);
        let mut failed = 0usize;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(body) => bodies.push(body),
                Err(e) => {
                    tracing::warn!(request = index, error = %format!("{e:#}"), "Exchange request failed");
                    failed += 1;
                    bodies.push(Vec::new());
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {total} requests failed");
        }

        tracing::debug!(requests = total, "Exchange requests completed");
        Ok(Responses::new(bodies))
    }

    fn reset(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(requests = self.pending.len(), "Dropping queued requests");
        }
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpTransport {
        HttpTransport::new(&TransportConfig::default()).unwrap()
    }

    #[test]
    fn test_prepare_returns_sequential_handles() {
        let mut transport = transport();
        let first = transport
            .prepare(&RequestSpec::new("tradeogre.com", 443, "/api/v1/history/MWC-BTC"))
            .unwrap();
        let second = transport
            .prepare(&RequestSpec::new("tradeogre.com", 443, "/api/v1/ticker/BTC-USDT"))
            .unwrap();
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(
            transport.pending[1].url().as_str(),
            "https://tradeogre.com/api/v1/ticker/BTC-USDT"
        );
    }

    #[test]
    fn test_prepare_rejects_bad_host() {
        let mut transport = transport();
        let result = transport.prepare(&RequestSpec::new("trade ogre.com", 443, "/api/v1"));
        assert!(result.is_err());
        assert!(transport.pending.is_empty());
    }

    #[test]
    fn test_reset_drops_queued_requests() {
        let mut transport = transport();
        transport
            .prepare(&RequestSpec::new("tradeogre.com", 443, "/api/v1/history/MWC-BTC"))
            .unwrap();
        assert!(transport
            .prepare(&RequestSpec::new("trade ogre.com", 443, "/api/v1/ticker/BTC-USDT"))
            .is_err());

        transport.reset();
        assert!(transport.pending.is_empty());
        let handle = transport
            .prepare(&RequestSpec::new("tradeogre.com", 443, "/api/v1/history/MWC-BTC"))
            .unwrap();
        assert_eq!(handle.index(), 0);
    }

    #[tokio::test]
    async fn test_execute_empty_batch() {
        let mut transport = transport();
        let mut responses = transport.execute_all().await.unwrap();
        assert!(responses.take(RequestHandle::new(0)).is_empty());
    }
}
