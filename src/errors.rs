//! Unified error types for the scheduling core.
//!
//! Expected failures (missing records, bad input, store failures) are returned as
//! values of [`Error`]; nothing in the core panics on them.

use thiserror::Error;

/// All errors the scheduling core can report.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced booking, bundle, patient or therapy does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up (e.g. `"booking"`)
        entity: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Malformed input to an operation.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description of the problem
        message: String,
    },

    /// The booking store adapter reported a failure. Callers may retry.
    #[error("Store error: {message}")]
    Store {
        /// Message reported by the adapter
        message: String,
    },

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Raw database error outside of the store adapter (schema setup, connections).
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] with any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether retrying the same call could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::Database(_))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
