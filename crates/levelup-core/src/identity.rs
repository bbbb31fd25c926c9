// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The stored identity record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::Role;

// =============================================================================
// Identity
// =============================================================================

/// An account known to the identity store.
///
/// The subject is the account's email address and its primary key.
#[derive(Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Unique subject (email).
    pub subject: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    /// Whether the account has been enabled.
    pub enabled: bool,
    /// Whether the account is locked.
    pub locked: bool,
    /// Roles held by the account.
    pub roles: Vec<Role>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Creates a freshly registered identity awaiting activation.
    ///
    /// New identities start disabled and locked, holding only [`Role::User`].
    pub fn pending(subject: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            subject: subject.into(),
            password_hash: password_hash.into(),
            enabled: false,
            locked: true,
            roles: vec![Role::User],
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an already active identity with the given roles.
    pub fn active(
        subject: impl Into<String>,
        password_hash: impl Into<String>,
        roles: Vec<Role>,
    ) -> Self {
        let mut identity = Self::pending(subject, password_hash);
        identity.enabled = true;
        identity.locked = false;
        identity.roles = normalize_roles(roles);
        identity
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the locked flag.
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Returns `true` if the account is enabled and not locked.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.locked
    }

    /// Enables and unlocks the account.
    pub fn activate(&mut self) {
        self.enabled = true;
        self.locked = false;
        self.touch();
    }

    /// Replaces the password hash.
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    /// Replaces the roles. Duplicates are dropped and order is normalized.
    pub fn set_roles(&mut self, roles: Vec<Role>) {
        self.roles = normalize_roles(roles);
        self.touch();
    }

    /// Returns `true` if the identity holds the role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &self.subject)
            .field("password_hash", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .field("locked", &self.locked)
            .field("roles", &self.roles)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

fn normalize_roles(mut roles: Vec<Role>) -> Vec<Role> {
    roles.sort();
    roles.dedup();
    roles
}
