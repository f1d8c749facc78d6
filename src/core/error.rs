//! Failure taxonomy for a single conversion invocation.

use thiserror::Error;

/// Errors that terminate a conversion. None of them are retried internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConvertError {
    /// `usd_amount` is missing or not a number.
    #[error("Invalid usd_amount: {0}")]
    Input(String),

    /// The rate source could not be reached or answered with a non-success status.
    #[error("Rate source unavailable: {0}")]
    Upstream(String),

    /// The rate source answered but the document is not what we expect.
    #[error("Unexpected rate source data: {0}")]
    UpstreamData(String),

    /// The caller gave up before the rate source answered.
    #[error("Conversion cancelled before the rate source responded")]
    Cancelled,
}

impl ConvertError {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> u16 {
        match self {
            ConvertError::Input(_) => 400,
            ConvertError::Upstream(_) | ConvertError::UpstreamData(_) => 502,
            ConvertError::Cancelled => 503,
        }
    }

    /// Stable machine-readable name, used as the `error` field of error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::Input(_) => "input_error",
            ConvertError::Upstream(_) => "upstream_error",
            ConvertError::UpstreamData(_) => "upstream_data_error",
            ConvertError::Cancelled => "cancelled",
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;
