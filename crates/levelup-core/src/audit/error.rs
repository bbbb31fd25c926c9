// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit trail errors.
//!
//! Callers in the auth path log these and carry on: a failed audit write
//! never fails a login or an account change.

use thiserror::Error;

/// Errors raised by an [`AuditLogger`](super::AuditLogger).
#[derive(Debug, Error)]
pub enum AuditError {
    /// The logger forwards entries and keeps nothing to search.
    #[error("Audit logger '{logger}' keeps no entries to query")]
    QueryNotSupported {
        /// Name of the logger.
        logger: String,
    },
}

impl AuditError {
    pub fn query_not_supported(logger: impl Into<String>) -> Self {
        Self::QueryNotSupported {
            logger: logger.into(),
        }
    }
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
