// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication context.

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use levelup_core::{Permission, Role};
use uuid::Uuid;

use super::DecodedToken;

/// The authenticated principal of a single request.
///
/// Bound into the request's extensions by the authentication layer and
/// dropped with the request. Absence of a context means the request is
/// unauthenticated.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Subject (email).
    pub subject: String,
    /// Authorities: permission strings plus role markers.
    pub authorities: Arc<BTreeSet<String>>,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// When the backing token expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthContext {
    /// Creates a context for a subject with the given authorities.
    pub fn new(subject: impl Into<String>, authorities: BTreeSet<String>) -> Self {
        Self {
            subject: subject.into(),
            authorities: Arc::new(authorities),
            client_ip: None,
            request_id: Uuid::now_v7(),
            expires_at: None,
        }
    }

    /// Creates a context from a verified token.
    pub fn from_token(token: DecodedToken) -> Self {
        Self {
            subject: token.subject,
            authorities: Arc::new(token.authorities),
            client_ip: None,
            request_id: Uuid::now_v7(),
            expires_at: Some(token.expires_at),
        }
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.client_ip = ip;
        self
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Sets the expiry.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns `true` if the context carries the authority string.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// Returns `true` if the context holds the role.
    pub fn has_role(&self, role: Role) -> bool {
        self.has_authority(role.authority())
    }

    /// Returns `true` if the context carries the permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.has_authority(permission.as_str())
    }

    /// Returns `true` if the context holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Returns the sorted authority list.
    pub fn authority_list(&self) -> Vec<String> {
        self.authorities.iter().cloned().collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
