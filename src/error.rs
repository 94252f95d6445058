//! Error types for association rule mining.
//!
//! Mining itself is infallible for well-formed input; errors come from
//! configuration, hand-built transactions, rule storage and I/O.

use thiserror::Error;

/// Main error type for basket-rules operations.
///
/// # Examples
///
/// ```
/// use basket_rules::error::BasketError;
///
/// let err = BasketError::InsufficientItems { found: 1 };
/// assert!(err.to_string().contains("at least 2"));
/// ```
#[derive(Debug, Error)]
pub enum BasketError {
    /// A threshold or cap is outside its valid range.
    #[error("Invalid threshold: {param} = {value}, expected {constraint}")]
    InvalidThreshold {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// A transaction was built from fewer than two distinct items.
    #[error("Transaction needs at least 2 distinct items, found {found}")]
    InsufficientItems {
        /// Number of distinct items supplied
        found: usize,
    },

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The rule store rejected an operation.
    #[error("Rule store error: {0}")]
    Store(String),

    /// I/O error (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BasketError {
    /// Create an invalid threshold error with descriptive context
    #[must_use]
    pub fn invalid_threshold(param: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidThreshold {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, BasketError>;
