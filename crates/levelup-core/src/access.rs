// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access requirements attached to routes.
//!
//! The string form is used in configuration files:
//!
//! | Form                          | Access                      |
//! |-------------------------------|-----------------------------|
//! | `public`, `permitAll`         | [`Access::Public`]          |
//! | `authenticated`               | [`Access::Authenticated`]   |
//! | `role:ADMIN`, `hasRole('ADMIN')` | [`Access::Role`]         |
//! | `authority:game:read`, `hasAuthority('game:read')` | [`Access::Authority`] |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::role::Role;

/// Error returned for an access string that does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid access rule '{input}': {reason}")]
pub struct AccessParseError {
    /// The rejected input.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

impl AccessParseError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// What a request must carry to reach a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Access {
    /// Anyone, with or without a token.
    Public,
    /// Any authenticated subject.
    Authenticated,
    /// A subject holding the role.
    Role(Role),
    /// A subject carrying the authority string.
    Authority(String),
}

impl Access {
    /// Parses an access string.
    pub fn parse(input: &str) -> Result<Self, AccessParseError> {
        let s = input.trim();

        match s.to_ascii_lowercase().as_str() {
            "public" | "permitall" | "permit_all" => return Ok(Access::Public),
            "authenticated" => return Ok(Access::Authenticated),
            _ => {}
        }

        if let Some(role) = s.strip_prefix("role:").or_else(|| call_argument(s, "hasRole")) {
            return Role::parse(role)
                .map(Access::Role)
                .ok_or_else(|| AccessParseError::new(input, format!("unknown role '{}'", role)));
        }

        if let Some(authority) = s
            .strip_prefix("authority:")
            .or_else(|| call_argument(s, "hasAuthority"))
        {
            let authority = authority.trim();
            if authority.is_empty() {
                return Err(AccessParseError::new(input, "authority must not be empty"));
            }
            return Ok(Access::Authority(authority.to_string()));
        }

        Err(AccessParseError::new(
            input,
            "expected public, authenticated, role:<ROLE> or authority:<AUTHORITY>",
        ))
    }

    /// Returns `true` for [`Access::Public`].
    pub fn is_public(&self) -> bool {
        matches!(self, Access::Public)
    }

    /// Returns the authority string a subject must carry, if any.
    pub fn required_authority(&self) -> Option<&str> {
        match self {
            Access::Public | Access::Authenticated => None,
            Access::Role(role) => Some(role.authority()),
            Access::Authority(authority) => Some(authority),
        }
    }
}

/// Extracts `x` from `name(x)` or `name('x')`.
fn call_argument<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let inner = s.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')?.trim();
    Some(
        inner
            .strip_prefix('\'')
            .and_then(|i| i.strip_suffix('\''))
            .unwrap_or(inner),
    )
}

impl std::fmt::Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Public => write!(f, "public"),
            Access::Authenticated => write!(f, "authenticated"),
            Access::Role(role) => write!(f, "role:{}", role),
            Access::Authority(authority) => write!(f, "authority:{}", authority),
        }
    }
}

impl std::str::FromStr for Access {
    type Err = AccessParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Access::parse(s)
    }
}

impl TryFrom<String> for Access {
    type Error = AccessParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Access::parse(&value)
    }
}

impl From<Access> for String {
    fn from(access: Access) -> Self {
        access.to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================
