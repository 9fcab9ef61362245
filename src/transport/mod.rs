//! Transport layer - performs the HTTP requests an oracle prepares
//!
//! Oracles queue requests with [`Transport::prepare`] and run them together
//! with [`Transport::execute_all`]. How the requests reach the exchange
//! (proxying, pooling, parallelism, timeouts) is up to the implementation.

mod http;

pub use http::HttpTransport;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// HTTPS GET request descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl RequestSpec {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
        }
    }

    pub fn url(&self) -> String {
        format!("https://{}:{}{}", self.host, self.port, self.path)
    }
}

impl fmt::Display for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.host, self.port, self.path)
    }
}

/// Identifies a prepared request within one `execute_all` batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle(usize);

impl RequestHandle {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Response bodies of one executed batch, indexed by handle
#[derive(Debug, Default)]
pub struct Responses {
    bodies: Vec<Vec<u8>>,
}

impl Responses {
    pub fn new(bodies: Vec<Vec<u8>>) -> Self {
        Self { bodies }
    }

    /// Moves a body out. Unknown handles and already taken bodies are empty.
    pub fn take(&mut self, handle: RequestHandle) -> Vec<u8> {
        self.bodies
            .get_mut(handle.index())
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

/// Request-construction and request-execution collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send {
    /// Queue a request, failing if it cannot be constructed
    fn prepare(&mut self, request: &RequestSpec) -> Result<RequestHandle>;

    /// Execute every queued request and drain the queue
    async fn execute_all(&mut self) -> Result<Responses>;

    /// Drop queued requests without executing them
    fn reset(&mut self);
}
