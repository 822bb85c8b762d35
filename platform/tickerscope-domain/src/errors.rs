use serde::Serialize;
use thiserror::Error;

/// Ticker-scoped conditions surfaced by a dashboard pass. None of them aborts the pass.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardError {
    /// The provider returned no bars for the ticker.
    #[error("no data found for {ticker}")]
    NoDataForTicker { ticker: String },

    /// Network or provider failure while fetching the ticker.
    #[error("failed to fetch {ticker}: {message}")]
    FetchFailure { ticker: String, message: String },

    /// A summary statistic could not be computed (zero start price, too few returns).
    #[error("{quantity} is undefined for {ticker}")]
    DivisionUndefined {
        ticker: String,
        quantity: &'static str,
    },

    /// Every requested ticker failed.
    #[error("No data found for the selected tickers")]
    EmptyResultSet,
}

impl DashboardError {
    pub fn ticker(&self) -> Option<&str> {
        match self {
            Self::NoDataForTicker { ticker }
            | Self::FetchFailure { ticker, .. }
            | Self::DivisionUndefined { ticker, .. } => Some(ticker),
            Self::EmptyResultSet => None,
        }
    }

    /// Skipped tickers produce no summary; undefined statistics still do.
    pub fn skips_ticker(&self) -> bool {
        matches!(
            self,
            Self::NoDataForTicker { .. } | Self::FetchFailure { .. }
        )
    }
}

/// Errors raised by a `MarketDataRepository` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// The provider answered with an error status or error payload.
    #[error("provider error: {0}")]
    Api(String),

    /// The response body could not be decoded into bars.
    #[error("failed to decode provider response: {0}")]
    Decode(String),
}
