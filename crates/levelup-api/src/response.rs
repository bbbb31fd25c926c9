// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use levelup_core::{Identity, Role};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthContext, IssuedToken};
use crate::cookie::{set_cookie_header, CookieConfig};
use crate::middleware::BEARER_PREFIX;

// =============================================================================
// Login
// =============================================================================

/// Login response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Access token.
    pub token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Expires in seconds.
    pub expires_in: i64,
}

impl AuthResponse {
    /// Creates a new auth response.
    pub fn new(token: String, expires_in: i64) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// Successful login.
///
/// Carries the token in the `Authorization` header (exposed to browsers),
/// in the authorization cookie when enabled, and in the JSON body.
#[derive(Debug)]
pub struct LoginResponse {
    token: IssuedToken,
    cookie: CookieConfig,
}

impl LoginResponse {
    /// Creates a login response.
    pub fn new(token: IssuedToken, cookie: CookieConfig) -> Self {
        Self { token, cookie }
    }
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        let body = AuthResponse::new(self.token.token.clone(), self.token.expires_in);
        let mut response = (StatusCode::OK, Json(body)).into_response();
        let headers = response.headers_mut();

        match HeaderValue::from_str(&format!("{}{}", BEARER_PREFIX, self.token.token)) {
            Ok(value) => {
                headers.insert(header::AUTHORIZATION, value);
                headers.insert(
                    header::ACCESS_CONTROL_EXPOSE_HEADERS,
                    HeaderValue::from_static("Authorization"),
                );
            }
            Err(e) => tracing::warn!(error = %e, "Token is not a valid header value"),
        }

        if self.cookie.enabled {
            let cookie = self.cookie.auth_cookie(&self.token.token, self.token.expires_in);
            if let Some(value) = set_cookie_header(&cookie) {
                headers.append(header::SET_COOKIE, value);
            }
        }

        response
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Logout response. Clears the authorization cookie.
#[derive(Debug)]
pub struct LogoutResponse {
    cookie: CookieConfig,
}

impl LogoutResponse {
    /// Creates a logout response.
    pub fn new(cookie: CookieConfig) -> Self {
        Self { cookie }
    }
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        let mut response = Json(MessageResponse::ok("Logged out successfully")).into_response();
        if let Some(value) = set_cookie_header(&self.cookie.logout_cookie()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }
}

// =============================================================================
// Typed Responses
// =============================================================================

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a success message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    /// Subject (email).
    pub subject: String,
    /// Authorities carried by the token.
    pub authorities: Vec<String>,
    /// When the token expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<AuthContext> for CurrentUserResponse {
    fn from(ctx: AuthContext) -> Self {
        Self {
            authorities: ctx.authority_list(),
            subject: ctx.subject,
            expires_at: ctx.expires_at,
        }
    }
}

/// An identity without its password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityResponse {
    /// Subject (email).
    pub subject: String,
    /// Whether the account is activated.
    pub enabled: bool,
    /// Whether the account is locked.
    pub locked: bool,
    /// Roles.
    pub roles: Vec<Role>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            subject: identity.subject,
            enabled: identity.enabled,
            locked: identity.locked,
            roles: identity.roles,
            created_at: identity.created_at,
            updated_at: identity.updated_at,
        }
    }
}

/// Registration result.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationResponse {
    /// The registered identity.
    pub identity: IdentityResponse,
    /// Token that activates the identity.
    pub activation_token: String,
}

// =============================================================================
// Tests
// =============================================================================
