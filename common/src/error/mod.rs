//! Error types for corebank
//!
//! This module provides a unified error handling system for all services in
//! the platform. Every failure mode of the transaction core maps to its own
//! variant so that callers (and the API layer) can translate each kind into a
//! distinct, stable code.

use std::fmt::Display;
use thiserror::Error;

/// Corebank error type
#[derive(Debug, Error)]
pub enum Error {
    /// The transaction request is missing or malformed (e.g. no kind)
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// No handler is registered for the requested transaction kind
    #[error("Unsupported transaction kind: {0}")]
    UnsupportedTransactionKind(String),

    /// The amount violates the sign convention for the transaction kind
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Error when an account has insufficient funds
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Error when an account cannot be found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Error when a client cannot be found
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Error when a transaction record cannot be found
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// An account guard could not be acquired within the timeout; retryable
    #[error("Contention: {0}")]
    Contention(String),

    /// Generic validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Decimal conversion error
    #[error("Decimal conversion error: {0}")]
    DecimalError(String),
}

impl Error {
    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidTransaction(_) => "invalid_transaction",
            Error::UnsupportedTransactionKind(_) => "unsupported_transaction_kind",
            Error::InvalidAmount(_) => "invalid_amount",
            Error::InsufficientBalance(_) => "insufficient_balance",
            Error::AccountNotFound(_) => "account_not_found",
            Error::ClientNotFound(_) => "client_not_found",
            Error::TransactionNotFound(_) => "transaction_not_found",
            Error::Contention(_) => "contention",
            Error::ValidationError(_) => "validation_error",
            Error::ConfigurationError(_) => "configuration_error",
            Error::Internal(_) => "internal_error",
            Error::Database(_) => "database_error",
            Error::Serialization(_) => "serialization_error",
            Error::DecimalError(_) => "decimal_error",
        }
    }

    /// Whether the caller may safely retry the operation. Only guard
    /// contention qualifies: nothing has mutated when it is raised.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Contention(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::InvalidTransaction(msg) => {
                    Error::InvalidTransaction(format!("{}: {}", context, msg))
                }
                Error::UnsupportedTransactionKind(msg) => {
                    Error::UnsupportedTransactionKind(format!("{}: {}", context, msg))
                }
                Error::InvalidAmount(msg) => Error::InvalidAmount(format!("{}: {}", context, msg)),
                Error::InsufficientBalance(msg) => {
                    Error::InsufficientBalance(format!("{}: {}", context, msg))
                }
                Error::AccountNotFound(msg) => {
                    Error::AccountNotFound(format!("{}: {}", context, msg))
                }
                Error::ClientNotFound(msg) => {
                    Error::ClientNotFound(format!("{}: {}", context, msg))
                }
                Error::TransactionNotFound(msg) => {
                    Error::TransactionNotFound(format!("{}: {}", context, msg))
                }
                Error::Contention(msg) => Error::Contention(format!("{}: {}", context, msg)),
                Error::ValidationError(msg) => {
                    Error::ValidationError(format!("{}: {}", context, msg))
                }
                Error::ConfigurationError(msg) => {
                    Error::ConfigurationError(format!("{}: {}", context, msg))
                }
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
                Error::Database(e) => Error::Database(e),
                Error::Serialization(e) => Error::Serialization(e),
                Error::DecimalError(msg) => Error::DecimalError(format!("{}: {}", context, msg)),
            }
        })
    }
}

/// Trait for converting other error types to our Error type
pub trait IntoError {
    /// Convert to Error
    fn into_error(self, message: &str) -> Error;
}

impl<E: std::error::Error> IntoError for E {
    fn into_error(self, message: &str) -> Error {
        Error::Internal(format!("{}: {}", message, self))
    }
}

/// Convert string messages into an error
impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Internal(message)
    }
}

/// Convert static string references into an error
impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Error::Internal(message.to_string())
    }
}

/// From sqlx::migrate::MigrateError
impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Error::Database(sqlx::Error::from(err))
    }
}

/// From rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::DecimalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            Error::InvalidTransaction(String::new()),
            Error::UnsupportedTransactionKind(String::new()),
            Error::InvalidAmount(String::new()),
            Error::InsufficientBalance(String::new()),
            Error::AccountNotFound(String::new()),
            Error::ClientNotFound(String::new()),
            Error::TransactionNotFound(String::new()),
            Error::Contention(String::new()),
            Error::ValidationError(String::new()),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn only_contention_is_retryable() {
        assert!(Error::Contention("timed out".into()).is_retryable());
        assert!(!Error::InsufficientBalance("x".into()).is_retryable());
        assert!(!Error::Internal("x".into()).is_retryable());
    }

    #[test]
    fn with_context_prefixes_message() {
        let res: Result<()> = Err(Error::AccountNotFound("id 7".into()));
        let err = res.with_context(|| "looking up source").unwrap_err();
        assert!(err.to_string().contains("looking up source"));
        assert_eq!(err.code(), "account_not_found");
    }
}
