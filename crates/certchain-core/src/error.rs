//! Error types for the ledger client and configuration.

use std::time::Duration;

use crate::clarity::WireError;

/// Ledger node errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Contract or function is not deployed on the node.
    #[error("contract not found: {contract}")]
    ContractNotFound { contract: String },

    /// The node evaluated the call and reported a failure.
    #[error("contract call failed: {cause}")]
    Contract { cause: String },

    /// Rate limit exceeded.
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Network error.
    #[error("network error: {message}")]
    Network { message: String },

    /// Invalid response from the node.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },
}

impl LedgerError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ContractNotFound { .. } => 2,
            Self::Contract { .. } => 5,

            // Network/transient
            Self::RateLimited { .. } => 5,
            Self::Network { .. } => 5,

            Self::InvalidResponse { .. } => 6,
        }
    }

    /// Whether the error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network { .. })
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

impl From<WireError> for LedgerError {
    fn from(err: WireError) -> Self {
        Self::InvalidResponse {
            message: err.to_string(),
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid config value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(LedgerError::Network {
            message: "reset".into()
        }
        .is_retryable());
        assert!(LedgerError::RateLimited { retry_after: None }.is_retryable());
        assert!(!LedgerError::Contract {
            cause: "Unchecked(NoSuchContract)".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_wire_error_becomes_invalid_response() {
        let err: LedgerError = WireError::TrailingBytes { count: 2 }.into();
        assert!(matches!(err, LedgerError::InvalidResponse { .. }));
        assert_eq!(err.exit_code(), 6);
    }
}
