// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization cookie handling.
//!
//! Login mirrors the token into an `Authorization` cookie whose value is
//! `Bearer <token>`. The value contains a space, so the cookie is always
//! written percent-encoded.

use axum::http::HeaderValue;
use cookie::{time, Cookie, SameSite};

/// Default cookie name.
pub const AUTH_COOKIE_NAME: &str = "Authorization";

// =============================================================================
// SameSitePolicy
// =============================================================================

/// `SameSite` attribute in configuration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSitePolicy {
    /// `SameSite=Strict`
    Strict,
    /// `SameSite=Lax`
    #[default]
    Lax,
    /// `SameSite=None`
    None,
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }
}

// =============================================================================
// CookieConfig
// =============================================================================

/// Configuration for the authorization cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Whether login sets the cookie at all.
    pub enabled: bool,
    /// Cookie name.
    pub name: String,
    /// Cookie path.
    pub path: String,
    /// Domain (None = current domain).
    pub domain: Option<String>,
    /// `HttpOnly` flag.
    pub http_only: bool,
    /// `Secure` flag. Enable behind TLS.
    pub secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSitePolicy,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: AUTH_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            domain: None,
            http_only: true,
            secure: false,
            same_site: SameSitePolicy::Lax,
        }
    }
}

impl CookieConfig {
    /// Creates the cookie carrying `Bearer <token>` for `max_age_secs`.
    pub fn auth_cookie(&self, token: &str, max_age_secs: i64) -> Cookie<'static> {
        self.base(format!("Bearer {}", token))
            .max_age(time::Duration::seconds(max_age_secs))
            .build()
    }

    /// Creates a cookie that clears the authorization cookie.
    pub fn logout_cookie(&self) -> Cookie<'static> {
        self.base(String::new())
            .max_age(time::Duration::ZERO)
            .expires(time::OffsetDateTime::UNIX_EPOCH)
            .build()
    }

    fn base(&self, value: String) -> cookie::CookieBuilder<'static> {
        let builder = Cookie::build((self.name.clone(), value))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site.into());

        match &self.domain {
            Some(domain) => builder.domain(domain.clone()),
            None => builder,
        }
    }
}

/// Renders a cookie as a percent-encoded `Set-Cookie` header value.
pub fn set_cookie_header(cookie: &Cookie<'_>) -> Option<HeaderValue> {
    HeaderValue::from_str(&cookie.encoded().to_string()).ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_cookie() {
        let cookie = CookieConfig::default().auth_cookie("aaa.bbb.ccc", 3600);

        assert_eq!(cookie.name(), "Authorization");
        assert_eq!(cookie.value(), "Bearer aaa.bbb.ccc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
    }

    #[test]
    fn test_cookie_is_percent_encoded() {
        let cookie = CookieConfig::default().auth_cookie("aaa.bbb.ccc", 60);
        let header = set_cookie_header(&cookie).unwrap();
        let header = header.to_str().unwrap();

        assert!(header.starts_with("Authorization=Bearer%20aaa.bbb.ccc"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
    }

    #[test]
    fn test_logout_cookie_expires() {
        let config = CookieConfig {
            secure: true,
            same_site: SameSitePolicy::Strict,
            ..CookieConfig::default()
        };
        let cookie = config.logout_cookie();

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn test_domain() {
        let config = CookieConfig {
            domain: Some("levelup.gg".to_string()),
            ..Default::default()
        };
        assert_eq!(config.auth_cookie("t", 1).domain(), Some("levelup.gg"));
    }
}
