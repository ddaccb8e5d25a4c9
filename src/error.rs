//! Error types for the campaign simulator

use thiserror::Error;

use crate::orderbook::Side;

/// Campaign simulator errors
#[derive(Error, Debug)]
pub enum TraderError {
    /// A quote was requested on a side with no resting levels. Recoverable:
    /// callers treat it as "no quote" and may fall back to formula pricing.
    #[error("no resting liquidity on the {side} side")]
    EmptyBook { side: Side },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("report output error: {0}")]
    ReportOutput(String),
}

impl From<config::ConfigError> for TraderError {
    fn from(err: config::ConfigError) -> Self {
        TraderError::Config(err.to_string())
    }
}

impl From<std::io::Error> for TraderError {
    fn from(err: std::io::Error) -> Self {
        TraderError::ReportOutput(err.to_string())
    }
}

impl From<csv::Error> for TraderError {
    fn from(err: csv::Error) -> Self {
        TraderError::ReportOutput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TraderError>;
