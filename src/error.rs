//! Error taxonomy shared by the store, gateway and exporters

use thiserror::Error;

/// Bad user input. Reported inline next to the triggering action, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("unsupported blockchain: {0}")]
    UnknownChain(String),

    #[error("invalid {chain} address format")]
    InvalidAddress { chain: String },

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("from date must be before to date")]
    InvalidDateRange,

    #[error("{0} must not be negative")]
    NegativeAmount(&'static str),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("no transaction with hash {0}")]
    UnknownTransaction(String),
}

/// Network or backend failure. The operation is abandoned and state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("backend returned HTTP {status}")]
    Status { status: u16 },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// File generation or download failure. No partial file is left on disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no analysis data available to export")]
    NothingToExport,

    #[error("file write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
}
