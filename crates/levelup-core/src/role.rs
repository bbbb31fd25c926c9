// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Roles and the role-to-permission registry.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::permission::{Permission, PermissionSet};

// =============================================================================
// Role
// =============================================================================

/// The closed set of roles an identity can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular catalog user.
    User,
    /// Catalog administrator.
    Admin,
}

impl Role {
    /// Returns the role name, which doubles as its authority marker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Returns the authority string granted by holding this role.
    pub fn authority(&self) -> &'static str {
        self.as_str()
    }

    /// Parses a role name.
    ///
    /// Accepts `USER`/`ADMIN` in any case and the `ROLE_` prefixed form.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(upper.as_str());
        match name {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Returns all roles.
    pub fn all() -> &'static [Role] {
        &[Role::User, Role::Admin]
    }

    /// Returns the canonical permission set for this role.
    pub fn permissions(&self) -> PermissionSet {
        match self {
            Role::User => PermissionSet::from_permissions([
                Permission::UserRead,
                Permission::GameRead,
                Permission::GenreRead,
                Permission::DeveloperRead,
            ]),
            Role::Admin => Permission::all().iter().copied().collect(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| format!("unknown role '{}'", s))
    }
}

// =============================================================================
// Role Registry
// =============================================================================

/// Role-to-permission registry.
///
/// Built once at startup and shared across requests behind an `Arc`. Every
/// lookup is pure over that static table.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    role_permissions: Arc<HashMap<Role, PermissionSet>>,
}

impl RoleRegistry {
    /// Creates a registry holding the canonical set for every role.
    pub fn new() -> Self {
        Self::builder().with_canonical_roles().build()
    }

    /// Creates a registry builder.
    pub fn builder() -> RoleRegistryBuilder {
        RoleRegistryBuilder::new()
    }

    /// Returns the permissions for a role.
    ///
    /// # Panics
    ///
    /// Panics if the role was not registered. Every `Role` is registered by
    /// [`RoleRegistry::new`], so this only fires for hand-built registries.
    pub fn permissions_for(&self, role: Role) -> &PermissionSet {
        self.role_permissions
            .get(&role)
            .unwrap_or_else(|| panic!("role {} is not registered", role))
    }

    /// Returns the authorities a role grants: its permissions plus its marker.
    pub fn authorities_for(&self, role: Role) -> BTreeSet<String> {
        let mut authorities: BTreeSet<String> = self
            .permissions_for(role)
            .authorities()
            .map(str::to_string)
            .collect();
        authorities.insert(role.authority().to_string());
        authorities
    }

    /// Returns the union of authorities for several roles.
    pub fn authorities_for_roles(&self, roles: &[Role]) -> BTreeSet<String> {
        roles
            .iter()
            .flat_map(|role| self.authorities_for(*role))
            .collect()
    }

    /// Returns the union of permissions for several roles.
    pub fn combined_permissions(&self, roles: &[Role]) -> PermissionSet {
        let mut combined = PermissionSet::new();
        for role in roles {
            combined.merge(self.permissions_for(*role));
        }
        combined
    }

    /// Returns `true` if any of the roles carries the permission.
    pub fn has_permission(&self, roles: &[Role], permission: Permission) -> bool {
        roles
            .iter()
            .any(|role| self.permissions_for(*role).contains(permission))
    }

    /// Returns `true` if the role is registered.
    pub fn contains(&self, role: Role) -> bool {
        self.role_permissions.contains_key(&role)
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Role Registry Builder
// =============================================================================

/// Builder for constructing a [`RoleRegistry`].
#[derive(Debug, Default)]
pub struct RoleRegistryBuilder {
    role_permissions: HashMap<Role, PermissionSet>,
}

impl RoleRegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every role with its canonical permissions.
    pub fn with_canonical_roles(mut self) -> Self {
        for role in Role::all() {
            self.role_permissions.insert(*role, role.permissions());
        }
        self
    }

    /// Registers a role with an explicit permission set.
    pub fn add_role(mut self, role: Role, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.role_permissions
            .insert(role, PermissionSet::from_permissions(permissions));
        self
    }

    /// Builds the registry.
    pub fn build(self) -> RoleRegistry {
        RoleRegistry {
            role_permissions: Arc::new(self.role_permissions),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
