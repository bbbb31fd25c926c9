// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit trail for authentication and identity lifecycle events.
//!
//! # Components
//!
//! - [`AuditLogger`]: Core trait for audit logger implementations
//! - [`AuditLog`]: Structured audit entry
//! - [`NoOpAuditLogger`]: Discards everything
//! - [`TracingAuditLogger`]: Emits entries as `tracing` events on the `audit` target
//! - [`InMemoryAuditLogger`]: Keeps entries in memory, supports queries
//!
//! # Example
//!
//! ```rust,ignore
//! use levelup_core::audit::{AuditLog, AuditLogger, TracingAuditLogger};
//!
//! let logger = TracingAuditLogger::new();
//! logger.log(AuditLog::login("user@user.com", None)).await?;
//! ```

mod error;
mod memory_logger;
mod types;

pub use error::{AuditError, AuditResult};
pub use memory_logger::InMemoryAuditLogger;
pub use types::{ActionResult, AuditAction, AuditFilter, AuditLog, AuditResource, AuditSeverity};

use async_trait::async_trait;

// =============================================================================
// Core Trait
// =============================================================================

/// Trait for audit logger implementations.
#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Records an audit entry.
    async fn log(&self, entry: AuditLog) -> AuditResult<()>;

    /// Records multiple entries.
    ///
    /// The default implementation calls `log` for each entry.
    async fn log_batch(&self, entries: Vec<AuditLog>) -> AuditResult<()> {
        for entry in entries {
            self.log(entry).await?;
        }
        Ok(())
    }

    /// Queries entries with the given filter.
    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<AuditLog>>;

    /// Flushes any buffered entries.
    async fn flush(&self) -> AuditResult<()>;

    /// Returns the logger name for identification.
    fn name(&self) -> &str {
        "audit_logger"
    }

    /// Returns `true` if this logger supports querying.
    fn supports_query(&self) -> bool {
        false
    }
}

// =============================================================================
// No-Op Logger
// =============================================================================

/// A no-op audit logger that discards all entries.
#[derive(Debug, Default, Clone)]
pub struct NoOpAuditLogger;

impl NoOpAuditLogger {
    /// Creates a new no-op logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for NoOpAuditLogger {
    async fn log(&self, _entry: AuditLog) -> AuditResult<()> {
        Ok(())
    }

    async fn query(&self, _filter: AuditFilter) -> AuditResult<Vec<AuditLog>> {
        Ok(Vec::new())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

// =============================================================================
// Tracing Logger
// =============================================================================

/// Audit logger that emits each entry as a structured `tracing` event.
///
/// Entries go to the `audit` target, so they can be routed or filtered
/// with an `EnvFilter` directive such as `audit=info`.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditLogger;

impl TracingAuditLogger {
    /// Creates a new tracing logger.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        let details = if entry.details.is_null() {
            String::new()
        } else {
            entry.details.to_string()
        };

        match entry.severity {
            AuditSeverity::Warning => tracing::warn!(
                target: "audit",
                id = %entry.id,
                action = %entry.action,
                resource = %entry.resource,
                result = entry.result.as_str(),
                actor = entry.actor.as_deref().unwrap_or("-"),
                client_ip = ?entry.client_ip,
                details = %details,
                "audit"
            ),
            _ => tracing::info!(
                target: "audit",
                id = %entry.id,
                action = %entry.action,
                resource = %entry.resource,
                result = entry.result.as_str(),
                actor = entry.actor.as_deref().unwrap_or("-"),
                client_ip = ?entry.client_ip,
                details = %details,
                "audit"
            ),
        }
        Ok(())
    }

    async fn query(&self, _filter: AuditFilter) -> AuditResult<Vec<AuditLog>> {
        Err(AuditError::query_not_supported(self.name()))
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_logger() {
        let logger = NoOpAuditLogger::new();

        assert!(logger.log(AuditLog::login("user@user.com", None)).await.is_ok());
        assert!(logger.query(AuditFilter::default()).await.unwrap().is_empty());
        assert!(logger.flush().await.is_ok());
    }

    #[tokio::test]
    async fn test_tracing_logger_rejects_query() {
        let logger = TracingAuditLogger::new();

        assert!(logger.log(AuditLog::system_start("0.1.0")).await.is_ok());
        assert!(matches!(
            logger.query(AuditFilter::default()).await,
            Err(AuditError::QueryNotSupported { .. })
        ));
        assert!(!logger.supports_query());
    }

    #[tokio::test]
    async fn test_log_batch_default() {
        let logger = InMemoryAuditLogger::new();
        logger
            .log_batch(vec![
                AuditLog::system_start("0.1.0"),
                AuditLog::system_shutdown(None),
            ])
            .await
            .unwrap();
        assert_eq!(logger.len(), 2);
    }
}
