//! Unified error types for the event-ledger service.
//!
//! Every fallible operation in the crate returns [`Result`]. Validation
//! failures are raised before any store call; database errors convert from
//! `sea_orm::DbErr` at the call site via `?`.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A monetary amount was negative, NaN, or infinite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount as supplied by the caller
        amount: f64,
    },

    /// Malformed or out-of-range input caught before touching the store.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of what was wrong
        message: String,
    },

    /// An operation referenced a row id that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `"event"` or `"ledger entry"`
        entity: &'static str,
        /// The id that failed to resolve
        id: i64,
    },

    /// Configuration error (environment variables, bind address).
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Underlying store failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error (socket binding, serving).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with a formatted message.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
