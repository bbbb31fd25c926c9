// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # levelup-core
//!
//! Core domain types for the LevelUp catalog security service.
//!
//! - **Permission**: Catalog permissions and permission sets
//! - **Role**: The closed role enum and the role-to-permission registry
//! - **Access**: Route access requirements
//! - **Identity**: The stored account record
//! - **Store**: The identity store contract and its in-memory implementation
//! - **Audit**: Security audit trail
//!
//! ## Example
//!
//! ```
//! use levelup_core::{Role, RoleRegistry};
//!
//! let registry = RoleRegistry::new();
//! let authorities = registry.authorities_for(Role::User);
//!
//! assert!(authorities.contains("USER"));
//! assert!(authorities.contains("game:read"));
//! assert!(!authorities.contains("game:write"));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod access;
pub mod audit;
pub mod error;
pub mod identity;
pub mod permission;
pub mod role;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use access::{Access, AccessParseError};
pub use error::{StoreError, StoreResult};
pub use identity::Identity;
pub use permission::{Permission, PermissionSet};
pub use role::{Role, RoleRegistry, RoleRegistryBuilder};
pub use store::{IdentityStore, InMemoryIdentityStore};

pub use audit::{
    ActionResult, AuditAction, AuditError, AuditFilter, AuditLog, AuditLogger, AuditResource,
    AuditSeverity, InMemoryAuditLogger, NoOpAuditLogger, TracingAuditLogger,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
