// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types shared by the identity store implementations.
//!
//! Store failures are never retried by callers. They surface unchanged
//! through the credential validator and the account operations, and end up
//! as an internal error at the HTTP edge.

use thiserror::Error;

// =============================================================================
// StoreError
// =============================================================================

/// Identity store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Identity store unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// A stored record could not be decoded.
    #[error("Corrupted identity record '{subject}': {message}")]
    Corrupted {
        /// Subject of the broken record.
        subject: String,
        /// Error message.
        message: String,
    },

    /// Any other backend failure.
    #[error("Identity store error: {message}")]
    Backend {
        /// Error message.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a corrupted record error.
    pub fn corrupted(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupted {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a backend error with source.
    pub fn backend_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } => "unavailable",
            StoreError::Corrupted { .. } => "corrupted",
            StoreError::Backend { .. } => "backend",
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::unavailable("connection refused");
        assert_eq!(err.to_string(), "Identity store unavailable: connection refused");
        assert_eq!(err.error_type(), "unavailable");
    }

    #[test]
    fn test_backend_with_source() {
        let io = std::io::Error::other("disk");
        let err = StoreError::backend_with("write failed", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
