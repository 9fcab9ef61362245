//! Error types for oracle evaluations
//!
//! Each failure names the feed it came from where one is known.

use thiserror::Error;

use crate::oracle::decimal::DecimalError;
use crate::oracle::Feed;

/// Why a required field was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("seconds since epoch {0} are out of range")]
    OutOfRange(i64),
    #[error(transparent)]
    Decimal(#[from] DecimalError),
}

/// Failure of one oracle evaluation. Every variant is terminal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("creating {feed} request failed")]
    RequestConstruction { feed: Feed },

    /// Execution failed or a response body came back empty. Which of the two
    /// requests failed is not reported here.
    #[error("performing {exchange} requests failed")]
    Transport { exchange: &'static str },

    #[error("{feed} response is not valid JSON")]
    MalformedResponse { feed: Feed },

    #[error("{feed} response is invalid: {detail}")]
    InvalidShape { feed: Feed, detail: &'static str },

    #[error("{feed} {field} is invalid: {reason}")]
    InvalidField {
        feed: Feed,
        field: &'static str,
        reason: FieldError,
    },

    #[error("result is invalid: {0}")]
    Computation(&'static str),

    #[error("formatting result failed: {0}")]
    Formatting(DecimalError),
}

impl OracleError {
    /// Feed the failure is attributed to, if any
    pub fn feed(&self) -> Option<Feed> {
        match self {
            Self::RequestConstruction { feed }
            | Self::MalformedResponse { feed }
            | Self::InvalidShape { feed, .. }
            | Self::InvalidField { feed, .. } => Some(*feed),
            Self::Transport { .. } | Self::Computation(_) | Self::Formatting(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OracleError>;
