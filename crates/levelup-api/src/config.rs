// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Runtime settings for the HTTP surface.
//!
//! Built by the binary from the loaded file configuration. Tests build it
//! directly with the `with_*` setters.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::auth::{JwtConfig, PasswordPolicy};
pub use crate::cookie::{CookieConfig, SameSitePolicy};

// =============================================================================
// ApiConfig
// =============================================================================

/// Settings consumed by [`ApiServer`](crate::ApiServer) and the auth layers.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Cross-origin policy.
    pub cors: CorsConfig,
    /// Token signing and lifetime.
    pub jwt: JwtConfig,
    /// Authorization cookie written at login.
    pub cookie: CookieConfig,
    /// Rules applied to new passwords.
    pub password: PasswordPolicy,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            cors: CorsConfig::default(),
            jwt: JwtConfig::default(),
            cookie: CookieConfig::default(),
            password: PasswordPolicy::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn with_jwt(mut self, jwt: JwtConfig) -> Self {
        self.jwt = jwt;
        self
    }

    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// Cross-origin policy. `*` in any list means "any".
///
/// `Authorization` is always exposed so browsers can read the token
/// returned by login.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    /// Only honored with an explicit origin list.
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds.
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: ["GET", "HEAD", "POST", "PUT", "DELETE", "OPTIONS"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: vec!["*".to_string()],
            allow_credentials: false,
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        is_wildcard(&self.allowed_origins)
    }

    pub fn allows_any_method(&self) -> bool {
        is_wildcard(&self.allowed_methods)
    }

    pub fn allows_any_header(&self) -> bool {
        is_wildcard(&self.allowed_headers)
    }

    /// Whether responses carry `Access-Control-Allow-Credentials: true`.
    pub fn sends_credentials(&self) -> bool {
        self.allow_credentials && !self.allows_any_origin()
    }
}

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v.trim() == "*")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.socket_addr().port(), 8080);
        assert_eq!(config.jwt.expiration_secs, JwtConfig::TWO_WEEKS);
        assert_eq!(config.cookie.name, "Authorization");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_credentials_need_explicit_origins() {
        let mut cors = CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert!(cors.allows_any_origin());
        assert!(!cors.sends_credentials());

        cors.allowed_origins = vec!["https://levelup.gg".to_string()];
        assert!(cors.sends_credentials());
        assert!(cors.allows_any_header());
        assert!(!cors.allows_any_method());
    }
}
