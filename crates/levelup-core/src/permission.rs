// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission definitions for the catalog resources.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fine-grained permissions over catalog resources.
///
/// Each permission renders as `"<resource>:<action>"`, which is also the
/// authority string embedded into issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    // =========================================================================
    // User Permissions
    // =========================================================================
    /// Read user profiles.
    #[serde(rename = "user:read")]
    UserRead,
    /// Create, update and delete users.
    #[serde(rename = "user:write")]
    UserWrite,

    // =========================================================================
    // Game Permissions
    // =========================================================================
    /// Read games.
    #[serde(rename = "game:read")]
    GameRead,
    /// Create, update and delete games.
    #[serde(rename = "game:write")]
    GameWrite,

    // =========================================================================
    // Genre Permissions
    // =========================================================================
    /// Read genres.
    #[serde(rename = "genre:read")]
    GenreRead,
    /// Create, update and delete genres.
    #[serde(rename = "genre:write")]
    GenreWrite,

    // =========================================================================
    // Developer Permissions
    // =========================================================================
    /// Read developers.
    #[serde(rename = "developer:read")]
    DeveloperRead,
    /// Create, update and delete developers.
    #[serde(rename = "developer:write")]
    DeveloperWrite,
}

impl Permission {
    /// Returns the permission name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UserRead => "user:read",
            Permission::UserWrite => "user:write",
            Permission::GameRead => "game:read",
            Permission::GameWrite => "game:write",
            Permission::GenreRead => "genre:read",
            Permission::GenreWrite => "genre:write",
            Permission::DeveloperRead => "developer:read",
            Permission::DeveloperWrite => "developer:write",
        }
    }

    /// Parses a permission from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        Permission::all().iter().copied().find(|p| p.as_str() == s)
    }

    /// Returns all available permissions.
    pub fn all() -> &'static [Permission] {
        &[
            Permission::UserRead,
            Permission::UserWrite,
            Permission::GameRead,
            Permission::GameWrite,
            Permission::GenreRead,
            Permission::GenreWrite,
            Permission::DeveloperRead,
            Permission::DeveloperWrite,
        ]
    }

    /// Returns `true` for read-only permissions.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            Permission::UserRead
                | Permission::GameRead
                | Permission::GenreRead
                | Permission::DeveloperRead
        )
    }

    /// Returns the resource this permission applies to.
    pub fn resource(&self) -> &'static str {
        match self {
            Permission::UserRead | Permission::UserWrite => "user",
            Permission::GameRead | Permission::GameWrite => "game",
            Permission::GenreRead | Permission::GenreWrite => "genre",
            Permission::DeveloperRead | Permission::DeveloperWrite => "developer",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Permission Set
// =============================================================================

/// An ordered set of permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a permission set from a list of permissions.
    pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Adds a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    /// Removes a permission from the set.
    pub fn remove(&mut self, permission: Permission) {
        self.permissions.remove(&permission);
    }

    /// Returns `true` if the set contains the given permission.
    pub fn contains(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Returns `true` if the set contains all of the given permissions.
    pub fn contains_all(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.permissions.contains(p))
    }

    /// Returns the number of permissions in the set.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Returns an iterator over the permissions.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Merges another permission set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        self.permissions.extend(other.permissions.iter().copied());
    }

    /// Returns the authority strings for every permission in the set.
    pub fn authorities(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.permissions.iter().map(|p| p.as_str())
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::from_permissions(iter)
    }
}

// =============================================================================
// Tests
// =============================================================================
