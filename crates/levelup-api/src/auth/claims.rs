// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims structure.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single granted authority, serialized as `{"authority": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantedAuthority {
    /// Authority string: a permission such as `game:read` or a role marker.
    pub authority: String,
}

impl GrantedAuthority {
    /// Creates a granted authority.
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }
}

/// JWT claims carried by access tokens.
///
/// Wire form: `{"sub", "authorities": [{"authority"}], "iat", "exp"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity's email.
    #[serde(default)]
    pub sub: String,

    /// Authorities granted at issuance.
    #[serde(default)]
    pub authorities: Vec<GrantedAuthority>,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Creates claims issued at `issued_at` and valid for `ttl_secs`.
    pub fn new<I, A>(subject: impl Into<String>, authorities: I, issued_at: DateTime<Utc>, ttl_secs: i64) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let iat = issued_at.timestamp();
        Self {
            sub: subject.into(),
            authorities: authorities
                .into_iter()
                .map(GrantedAuthority::new)
                .collect(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        }
    }

    /// Returns the authority strings as a set.
    pub fn authority_set(&self) -> BTreeSet<String> {
        self.authorities.iter().map(|a| a.authority.clone()).collect()
    }

    /// Returns `true` if the claims carry the authority.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a.authority == authority)
    }

    /// Returns the issued at time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

// =============================================================================
// Tests
// =============================================================================
