// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory audit logger.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::AuditLogger;
use super::error::AuditResult;
use super::types::{AuditAction, AuditFilter, AuditLog};

/// Audit logger that keeps entries in memory.
///
/// Used by the test harness and by development deployments. When a capacity
/// is set, the oldest entries are evicted first.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLogger {
    logs: Arc<RwLock<VecDeque<AuditLog>>>,
    /// Maximum number of entries to keep (0 = unlimited).
    max_entries: usize,
}

impl InMemoryAuditLogger {
    /// Creates a logger with unlimited capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a logger that keeps at most `max_entries`.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            logs: Arc::new(RwLock::new(VecDeque::with_capacity(max_entries.min(10_000)))),
            max_entries,
        }
    }

    /// Returns all entries, oldest first.
    pub fn entries(&self) -> Vec<AuditLog> {
        self.logs.read().iter().cloned().collect()
    }

    /// Returns entries for a specific action.
    pub fn entries_for_action(&self, action: AuditAction) -> Vec<AuditLog> {
        self.logs
            .read()
            .iter()
            .filter(|l| l.action == action)
            .cloned()
            .collect()
    }

    /// Checks if any entry matches the predicate.
    pub fn has_entry<F>(&self, predicate: F) -> bool
    where
        F: Fn(&AuditLog) -> bool,
    {
        self.logs.read().iter().any(predicate)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    /// Returns `true` if empty.
    pub fn is_empty(&self) -> bool {
        self.logs.read().is_empty()
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.logs.write().clear();
    }
}

#[async_trait]
impl AuditLogger for InMemoryAuditLogger {
    async fn log(&self, entry: AuditLog) -> AuditResult<()> {
        let mut logs = self.logs.write();
        if self.max_entries > 0 && logs.len() >= self.max_entries {
            logs.pop_front();
        }
        logs.push_back(entry);
        Ok(())
    }

    async fn query(&self, filter: AuditFilter) -> AuditResult<Vec<AuditLog>> {
        let logs = self.logs.read();
        let limit = filter.limit.unwrap_or(usize::MAX);
        Ok(logs
            .iter()
            .filter(|log| filter.matches(log))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn flush(&self) -> AuditResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }

    fn supports_query(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_and_query() {
        let logger = InMemoryAuditLogger::new();
        logger.log(AuditLog::login("a@x.com", None)).await.unwrap();
        logger
            .log(AuditLog::login_failed("b@x.com", None, "bad_credentials"))
            .await
            .unwrap();

        assert_eq!(logger.len(), 2);

        let failed = logger
            .query(AuditFilter::new().action(AuditAction::LoginFailed))
            .await
            .unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].resource.resource_id, "b@x.com");
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let logger = InMemoryAuditLogger::with_capacity(2);
        logger.log(AuditLog::register("1@x.com", None)).await.unwrap();
        logger.log(AuditLog::register("2@x.com", None)).await.unwrap();
        logger.log(AuditLog::register("3@x.com", None)).await.unwrap();

        let ids: Vec<_> = logger
            .entries()
            .into_iter()
            .map(|l| l.resource.resource_id)
            .collect();
        assert_eq!(ids, vec!["2@x.com", "3@x.com"]);
    }

    #[tokio::test]
    async fn test_query_limit() {
        let logger = InMemoryAuditLogger::new();
        for i in 0..5 {
            logger.log(AuditLog::register(format!("{i}@x.com"), None)).await.unwrap();
        }
        let out = logger.query(AuditFilter::new().limit(3)).await.unwrap();
        assert_eq!(out.len(), 3);
    }
}
