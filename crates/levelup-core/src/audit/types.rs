// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Audit entry types for the identity lifecycle.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

// =============================================================================
// Audit Log Entry
// =============================================================================

/// A single audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// Unique entry ID.
    pub id: Uuid,

    /// When the event occurred.
    pub timestamp: DateTime<Utc>,

    /// Severity level of the event.
    pub severity: AuditSeverity,

    /// Subject that performed the action, when known.
    pub actor: Option<String>,

    /// Client IP address.
    pub client_ip: Option<IpAddr>,

    /// The action that was performed.
    pub action: AuditAction,

    /// The resource that was affected.
    pub resource: AuditResource,

    /// Additional details about the action.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,

    /// The result of the action.
    pub result: ActionResult,

    /// Request ID for correlation with tracing output.
    pub request_id: Option<Uuid>,
}

impl AuditLog {
    /// Creates a new audit entry.
    pub fn new(action: AuditAction, resource: AuditResource, result: ActionResult) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            severity: action.default_severity(),
            actor: None,
            client_ip: None,
            action,
            resource,
            details: serde_json::Value::Null,
            result,
            request_id: None,
        }
    }

    /// Sets the acting subject and client address.
    pub fn with_actor(mut self, actor: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        self.actor = Some(actor.into());
        self.client_ip = client_ip;
        self
    }

    /// Sets the client address only.
    pub fn with_client_ip(mut self, client_ip: Option<IpAddr>) -> Self {
        self.client_ip = client_ip;
        self
    }

    /// Sets the details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, id: Uuid) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Sets the severity.
    pub fn with_severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    // =========================================================================
    // Factory methods
    // =========================================================================

    /// Successful login.
    pub fn login(subject: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        let subject = subject.into();
        Self::new(
            AuditAction::Login,
            AuditResource::identity(&subject),
            ActionResult::Success,
        )
        .with_actor(subject, client_ip)
    }

    /// Failed login. The reason is the credential error kind, never the password.
    pub fn login_failed(
        identifier: impl Into<String>,
        client_ip: Option<IpAddr>,
        reason: impl Into<String>,
    ) -> Self {
        let identifier = identifier.into();
        Self::new(
            AuditAction::LoginFailed,
            AuditResource::identity(&identifier),
            ActionResult::failure(reason),
        )
        .with_client_ip(client_ip)
    }

    /// Logout. The subject is absent for anonymous logouts.
    pub fn logout(subject: Option<&str>, client_ip: Option<IpAddr>) -> Self {
        let resource = match subject {
            Some(s) => AuditResource::identity(s),
            None => AuditResource::session(),
        };
        let log = Self::new(AuditAction::Logout, resource, ActionResult::Success);
        match subject {
            Some(s) => log.with_actor(s, client_ip),
            None => log.with_client_ip(client_ip),
        }
    }

    /// New identity registered.
    pub fn register(subject: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        let subject = subject.into();
        Self::new(
            AuditAction::Register,
            AuditResource::identity(&subject),
            ActionResult::Success,
        )
        .with_client_ip(client_ip)
    }

    /// Identity activated.
    pub fn activate(subject: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        Self::new(
            AuditAction::Activate,
            AuditResource::identity(subject),
            ActionResult::Success,
        )
        .with_client_ip(client_ip)
    }

    /// Password changed by its owner.
    pub fn password_change(subject: impl Into<String>, client_ip: Option<IpAddr>) -> Self {
        let subject = subject.into();
        Self::new(
            AuditAction::PasswordChange,
            AuditResource::identity(&subject),
            ActionResult::Success,
        )
        .with_actor(subject, client_ip)
    }

    /// Roles reassigned by an administrator.
    pub fn role_change(
        target: impl Into<String>,
        old_roles: &[Role],
        new_roles: &[Role],
        actor: impl Into<String>,
        client_ip: Option<IpAddr>,
    ) -> Self {
        let details = serde_json::json!({
            "old_roles": old_roles.iter().map(Role::as_str).collect::<Vec<_>>(),
            "new_roles": new_roles.iter().map(Role::as_str).collect::<Vec<_>>(),
        });

        Self::new(
            AuditAction::RoleChange,
            AuditResource::identity(target),
            ActionResult::Success,
        )
        .with_details(details)
        .with_actor(actor, client_ip)
    }

    /// Identity removed by an administrator.
    pub fn account_removed(
        target: impl Into<String>,
        actor: impl Into<String>,
        client_ip: Option<IpAddr>,
    ) -> Self {
        Self::new(
            AuditAction::AccountRemoved,
            AuditResource::identity(target),
            ActionResult::Success,
        )
        .with_actor(actor, client_ip)
    }

    /// Request blocked by the authorization gate.
    pub fn access_denied(
        method: impl Into<String>,
        path: impl Into<String>,
        actor: Option<&str>,
        client_ip: Option<IpAddr>,
        reason: impl Into<String>,
    ) -> Self {
        let method = method.into();
        let log = Self::new(
            AuditAction::AccessDenied,
            AuditResource::route(path),
            ActionResult::Denied,
        )
        .with_details(serde_json::json!({
            "method": method,
            "reason": reason.into(),
        }))
        .with_client_ip(client_ip);

        match actor {
            Some(a) => log.with_actor(a, client_ip),
            None => log,
        }
    }

    /// Service start.
    pub fn system_start(version: impl Into<String>) -> Self {
        Self::new(
            AuditAction::SystemStart,
            AuditResource::system(),
            ActionResult::Success,
        )
        .with_details(serde_json::json!({ "version": version.into() }))
    }

    /// Service shutdown.
    pub fn system_shutdown(reason: Option<String>) -> Self {
        let details = match reason {
            Some(r) => serde_json::json!({ "reason": r }),
            None => serde_json::Value::Null,
        };

        Self::new(
            AuditAction::SystemShutdown,
            AuditResource::system(),
            ActionResult::Success,
        )
        .with_details(details)
    }
}

// =============================================================================
// Audit Severity
// =============================================================================

/// Severity level for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Normal operations.
    #[default]
    Info,
    /// Normal but significant events.
    Notice,
    /// Potentially harmful situations.
    Warning,
}

impl AuditSeverity {
    /// Returns the severity level as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditSeverity::Info => "info",
            AuditSeverity::Notice => "notice",
            AuditSeverity::Warning => "warning",
        }
    }
}

impl std::fmt::Display for AuditSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audit Action
// =============================================================================

/// Types of auditable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // =========================================================================
    // Authentication
    // =========================================================================
    /// Successful login.
    Login,
    /// Failed login attempt.
    LoginFailed,
    /// Logout.
    Logout,

    // =========================================================================
    // Identity lifecycle
    // =========================================================================
    /// Identity registered.
    Register,
    /// Identity activated.
    Activate,
    /// Password changed.
    PasswordChange,
    /// Roles changed.
    RoleChange,
    /// Identity removed.
    AccountRemoved,

    // =========================================================================
    // Authorization
    // =========================================================================
    /// Request denied by the gate.
    AccessDenied,

    // =========================================================================
    // System
    // =========================================================================
    /// Service started.
    SystemStart,
    /// Service stopped.
    SystemShutdown,
}

impl AuditAction {
    /// Returns the action name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "login",
            AuditAction::LoginFailed => "login_failed",
            AuditAction::Logout => "logout",
            AuditAction::Register => "register",
            AuditAction::Activate => "activate",
            AuditAction::PasswordChange => "password_change",
            AuditAction::RoleChange => "role_change",
            AuditAction::AccountRemoved => "account_removed",
            AuditAction::AccessDenied => "access_denied",
            AuditAction::SystemStart => "system_start",
            AuditAction::SystemShutdown => "system_shutdown",
        }
    }

    /// Returns `true` if this is a security-sensitive action.
    pub fn is_security_sensitive(&self) -> bool {
        matches!(
            self,
            AuditAction::LoginFailed
                | AuditAction::PasswordChange
                | AuditAction::RoleChange
                | AuditAction::AccountRemoved
                | AuditAction::AccessDenied
        )
    }

    /// Returns the default severity for this action.
    pub fn default_severity(&self) -> AuditSeverity {
        match self {
            AuditAction::Login | AuditAction::Logout | AuditAction::Register | AuditAction::Activate => {
                AuditSeverity::Info
            }
            AuditAction::LoginFailed | AuditAction::AccessDenied => AuditSeverity::Warning,
            AuditAction::PasswordChange
            | AuditAction::RoleChange
            | AuditAction::AccountRemoved
            | AuditAction::SystemStart
            | AuditAction::SystemShutdown => AuditSeverity::Notice,
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Audit Resource
// =============================================================================

/// The resource affected by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResource {
    /// Resource type.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
}

impl AuditResource {
    /// Creates a resource reference.
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// An identity, keyed by subject.
    pub fn identity(subject: impl Into<String>) -> Self {
        Self::new("identity", subject)
    }

    /// An HTTP route.
    pub fn route(path: impl Into<String>) -> Self {
        Self::new("route", path)
    }

    /// An anonymous session.
    pub fn session() -> Self {
        Self::new("session", "anonymous")
    }

    /// The service itself.
    pub fn system() -> Self {
        Self::new("system", "levelup")
    }
}

impl std::fmt::Display for AuditResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.resource_id)
    }
}

// =============================================================================
// Action Result
// =============================================================================

/// Outcome of an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult {
    /// The action succeeded.
    #[default]
    Success,
    /// The action failed.
    Failure {
        /// Failure reason.
        reason: String,
    },
    /// The action was denied by authorization.
    Denied,
}

impl ActionResult {
    /// Creates a failure result.
    pub fn failure(reason: impl Into<String>) -> Self {
        ActionResult::Failure {
            reason: reason.into(),
        }
    }

    /// Returns `true` on success.
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success)
    }

    /// Returns `true` when denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, ActionResult::Denied)
    }

    /// Returns the result as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionResult::Success => "success",
            ActionResult::Failure { .. } => "failure",
            ActionResult::Denied => "denied",
        }
    }
}

// =============================================================================
// Audit Filter
// =============================================================================

/// Filter for querying audit entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Filter by acting subject.
    pub actor: Option<String>,
    /// Filter by action.
    pub action: Option<AuditAction>,
    /// Filter by resource ID.
    pub resource_id: Option<String>,
    /// Filter by minimum severity.
    pub min_severity: Option<AuditSeverity>,
    /// Start time (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl AuditFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by acting subject.
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Filters by action.
    pub fn action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Filters by resource ID.
    pub fn resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Filters by minimum severity.
    pub fn min_severity(mut self, severity: AuditSeverity) -> Self {
        self.min_severity = Some(severity);
        self
    }

    /// Keeps entries at or after `from`.
    pub fn since(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Checks if an entry matches this filter.
    pub fn matches(&self, log: &AuditLog) -> bool {
        if let Some(ref actor) = self.actor {
            if log.actor.as_ref() != Some(actor) {
                return false;
            }
        }

        if let Some(action) = self.action {
            if log.action != action {
                return false;
            }
        }

        if let Some(ref resource_id) = self.resource_id {
            if &log.resource.resource_id != resource_id {
                return false;
            }
        }

        if let Some(min_severity) = self.min_severity {
            if log.severity < min_severity {
                return false;
            }
        }

        if let Some(from) = self.from {
            if log.timestamp < from {
                return false;
            }
        }

        true
    }
}

// =============================================================================
// Tests
// =============================================================================
