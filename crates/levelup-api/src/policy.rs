// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route access policy.
//!
//! A [`RoutePolicy`] is an ordered list of [`RouteRule`]s. The first rule
//! whose pattern and method filter match a request decides its [`Access`];
//! requests no rule matches fall back to the policy's default access.
//!
//! Patterns are Ant-style: `*` matches exactly one path segment and `**`
//! matches any number of trailing or intermediate segments, including none.

use std::str::FromStr;

use axum::http::Method;
use levelup_core::{Access, Permission, Role};
use thiserror::Error;

use crate::auth::AuthContext;

pub use levelup_core::AccessParseError;

// =============================================================================
// GateError
// =============================================================================

/// Authorization gate denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// No authenticated context on a non-public route.
    #[error("Authentication required for '{path}'")]
    Unauthorized {
        /// Request path.
        path: String,
    },

    /// The context lacks the required authority.
    #[error("Access to '{path}' requires '{required}'")]
    Forbidden {
        /// Request path.
        path: String,
        /// The missing authority.
        required: String,
    },
}

impl GateError {
    /// Returns a short reason string for audit entries.
    pub fn reason(&self) -> String {
        match self {
            GateError::Unauthorized { .. } => "unauthenticated".to_string(),
            GateError::Forbidden { required, .. } => format!("missing authority '{}'", required),
        }
    }
}

/// Error building a policy from configuration.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The access string does not parse.
    #[error(transparent)]
    Access(#[from] AccessParseError),

    /// The pattern is not a valid route pattern.
    #[error("Invalid route pattern '{pattern}': {reason}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The method name is not a valid HTTP method.
    #[error("Invalid HTTP method '{0}'")]
    Method(String),
}

// =============================================================================
// RoutePattern
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Single,
    Any,
}

/// An Ant-style path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parses a pattern. Patterns must start with `/`.
    pub fn parse(pattern: &str) -> Result<Self, PolicyError> {
        if !pattern.starts_with('/') {
            return Err(PolicyError::Pattern {
                pattern: pattern.to_string(),
                reason: "must start with '/'".to_string(),
            });
        }

        let mut segments = Vec::new();
        for part in pattern.split('/').filter(|p| !p.is_empty()) {
            let segment = match part {
                "**" => Segment::Any,
                "*" => Segment::Single,
                p if p.contains('*') => {
                    return Err(PolicyError::Pattern {
                        pattern: pattern.to_string(),
                        reason: format!("wildcards must fill a whole segment, got '{}'", p),
                    });
                }
                p => Segment::Literal(p.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Returns `true` if the path matches.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        match_segments(&self.segments, &parts)
    }

    /// Returns the pattern string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Any, rest)) => (0..=path.len()).any(|skip| match_segments(rest, &path[skip..])),
        Some((Segment::Single, rest)) => !path.is_empty() && match_segments(rest, &path[1..]),
        Some((Segment::Literal(literal), rest)) => {
            path.first() == Some(&literal.as_str()) && match_segments(rest, &path[1..])
        }
    }
}

impl std::fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for RoutePattern {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoutePattern::parse(s)
    }
}

// =============================================================================
// RouteRule
// =============================================================================

/// A single entry in the route table.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Path pattern.
    pub pattern: RoutePattern,
    /// Methods the rule applies to. Empty means every method.
    pub methods: Vec<Method>,
    /// Required access.
    pub access: Access,
}

impl RouteRule {
    /// Creates a rule that applies to every method.
    pub fn new(pattern: RoutePattern, access: Access) -> Self {
        Self {
            pattern,
            methods: Vec::new(),
            access,
        }
    }

    /// Restricts the rule to the given methods.
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Builds a rule from configuration strings.
    pub fn from_parts<S: AsRef<str>>(pattern: &str, methods: &[S], access: &str) -> Result<Self, PolicyError> {
        let methods = methods
            .iter()
            .map(|m| {
                let name = m.as_ref().trim().to_ascii_uppercase();
                Method::from_bytes(name.as_bytes()).map_err(|_| PolicyError::Method(m.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            methods,
            access: Access::parse(access)?,
        })
    }

    /// Returns `true` if the rule applies to the request.
    pub fn matches(&self, method: &Method, path: &str) -> bool {
        (self.methods.is_empty() || self.methods.contains(method)) && self.pattern.matches(path)
    }
}

// =============================================================================
// RoutePolicy
// =============================================================================

/// Ordered route table. First match wins.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<RouteRule>,
    default_access: Access,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutePolicy {
    /// Creates an empty policy whose default is [`Access::Authenticated`].
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default_access: Access::Authenticated,
        }
    }

    /// Sets the access for requests no rule matches.
    pub fn with_default_access(mut self, access: Access) -> Self {
        self.default_access = access;
        self
    }

    /// Appends a rule.
    pub fn with_rule(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends a rule for every method.
    ///
    /// # Panics
    ///
    /// Panics if the pattern does not parse. Use [`RouteRule::from_parts`]
    /// for patterns that come from configuration.
    pub fn route(self, pattern: &str, access: Access) -> Self {
        self.route_for(&[], pattern, access)
    }

    /// Appends a rule for the given methods.
    ///
    /// # Panics
    ///
    /// Panics if the pattern does not parse.
    pub fn route_for(self, methods: &[Method], pattern: &str, access: Access) -> Self {
        let pattern = match RoutePattern::parse(pattern) {
            Ok(p) => p,
            Err(e) => panic!("static route pattern is invalid: {}", e),
        };
        self.with_rule(RouteRule::new(pattern, access).with_methods(methods.iter().cloned()))
    }

    /// The route table of the catalog service.
    ///
    /// Catalog resources require their `read` permission for safe methods
    /// and their `write` permission for everything else.
    pub fn catalog() -> Self {
        let mut policy = Self::new()
            .route("/health", Access::Public)
            .route("/ready", Access::Public)
            .route_for(&[Method::POST], "/api/v1/auth/login", Access::Public)
            .route_for(&[Method::POST], "/api/v1/auth/logout", Access::Public)
            .route_for(&[Method::POST], "/api/v1/auth/register", Access::Public)
            .route_for(&[Method::GET], "/api/v1/auth/activate/*", Access::Public)
            .route("/api/v1/auth/**", Access::Authenticated)
            .route("/api/v1/admin/**", Access::Role(Role::Admin));

        for (prefix, read, write) in [
            ("/api/v1/games/**", Permission::GameRead, Permission::GameWrite),
            ("/api/v1/genres/**", Permission::GenreRead, Permission::GenreWrite),
            ("/api/v1/developers/**", Permission::DeveloperRead, Permission::DeveloperWrite),
            ("/api/v1/users/**", Permission::UserRead, Permission::UserWrite),
        ] {
            policy = policy
                .route_for(
                    &[Method::GET, Method::HEAD],
                    prefix,
                    Access::Authority(read.as_str().to_string()),
                )
                .route(prefix, Access::Authority(write.as_str().to_string()));
        }

        policy
    }

    /// Returns the access that applies to a request.
    pub fn resolve(&self, method: &Method, path: &str) -> &Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| &rule.access)
            .unwrap_or(&self.default_access)
    }

    /// Decides whether a request may proceed.
    pub fn evaluate(
        &self,
        method: &Method,
        path: &str,
        context: Option<&AuthContext>,
    ) -> Result<(), GateError> {
        let access = self.resolve(method, path);
        if access.is_public() {
            return Ok(());
        }

        let Some(context) = context else {
            return Err(GateError::Unauthorized {
                path: path.to_string(),
            });
        };

        match access.required_authority() {
            Some(required) if !context.has_authority(required) => Err(GateError::Forbidden {
                path: path.to_string(),
                required: required.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Returns the rules in evaluation order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Returns the default access.
    pub fn default_access(&self) -> &Access {
        &self.default_access
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use levelup_core::RoleRegistry;

    fn ctx(role: Role) -> AuthContext {
        AuthContext::new("someone@levelup.gg", RoleRegistry::new().authorities_for(role))
    }

    #[test]
    fn test_pattern_matching() {
        let p = RoutePattern::parse("/api/v1/games/**").unwrap();
        assert!(p.matches("/api/v1/games"));
        assert!(p.matches("/api/v1/games/"));
        assert!(p.matches("/api/v1/games/42/reviews"));
        assert!(!p.matches("/api/v1/gamesx"));
        assert!(!p.matches("/api/v1/genres/1"));

        let p = RoutePattern::parse("/api/v1/auth/activate/*").unwrap();
        assert!(p.matches("/api/v1/auth/activate/a@b.com"));
        assert!(!p.matches("/api/v1/auth/activate"));
        assert!(!p.matches("/api/v1/auth/activate/a/b"));

        let p = RoutePattern::parse("/api/**/export").unwrap();
        assert!(p.matches("/api/export"));
        assert!(p.matches("/api/v1/games/export"));
        assert!(!p.matches("/api/v1/games"));
    }

    #[test]
    fn test_pattern_rejects() {
        assert!(RoutePattern::parse("api/v1").is_err());
        assert!(RoutePattern::parse("/api/v*").is_err());
    }

    #[test]
    fn test_first_match_wins() {
        let policy = RoutePolicy::new()
            .route("/api/v1/auth/login", Access::Public)
            .route("/api/v1/auth/**", Access::Role(Role::Admin));

        assert_eq!(
            policy.resolve(&Method::POST, "/api/v1/auth/login"),
            &Access::Public
        );
        assert_eq!(
            policy.resolve(&Method::POST, "/api/v1/auth/me"),
            &Access::Role(Role::Admin)
        );
        assert_eq!(
            policy.resolve(&Method::GET, "/elsewhere"),
            &Access::Authenticated
        );
    }

    #[test]
    fn test_method_filter() {
        let policy = RoutePolicy::catalog();
        assert_eq!(
            policy.resolve(&Method::GET, "/api/v1/games/1"),
            &Access::Authority("game:read".into())
        );
        assert_eq!(
            policy.resolve(&Method::DELETE, "/api/v1/games/1"),
            &Access::Authority("game:write".into())
        );
        assert_eq!(
            policy.resolve(&Method::GET, "/api/v1/auth/login"),
            &Access::Authenticated
        );
    }

    #[test]
    fn test_public_route_passes_without_context() {
        let policy = RoutePolicy::catalog();
        assert!(policy.evaluate(&Method::GET, "/health", None).is_ok());
        assert!(policy.evaluate(&Method::POST, "/api/v1/auth/login", None).is_ok());
        assert!(policy
            .evaluate(&Method::GET, "/api/v1/auth/activate/new@user.com", None)
            .is_ok());
    }

    #[test]
    fn test_missing_context_is_unauthorized() {
        let policy = RoutePolicy::catalog();
        assert_eq!(
            policy.evaluate(&Method::GET, "/api/v1/auth/me", None),
            Err(GateError::Unauthorized {
                path: "/api/v1/auth/me".into()
            })
        );
        assert!(matches!(
            policy.evaluate(&Method::GET, "/unmapped", None),
            Err(GateError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_role_gating() {
        let policy = RoutePolicy::catalog();
        let path = "/api/v1/admin/users/user@user.com";

        assert_eq!(
            policy.evaluate(&Method::GET, path, Some(&ctx(Role::User))),
            Err(GateError::Forbidden {
                path: path.into(),
                required: "ADMIN".into()
            })
        );
        assert!(policy.evaluate(&Method::GET, path, Some(&ctx(Role::Admin))).is_ok());
    }

    #[test]
    fn test_authority_gating() {
        let policy = RoutePolicy::catalog();
        let user = ctx(Role::User);

        assert!(policy.evaluate(&Method::GET, "/api/v1/games/7", Some(&user)).is_ok());
        assert!(policy.evaluate(&Method::POST, "/api/v1/games", Some(&user)).is_err());
        assert!(policy
            .evaluate(&Method::POST, "/api/v1/games", Some(&ctx(Role::Admin)))
            .is_ok());
    }

    #[test]
    fn test_rule_from_parts() {
        let rule = RouteRule::from_parts("/api/v1/games/**", &["get", "HEAD"], "hasAuthority('game:read')").unwrap();
        assert_eq!(rule.methods, vec![Method::GET, Method::HEAD]);
        assert!(rule.matches(&Method::GET, "/api/v1/games/1"));
        assert!(!rule.matches(&Method::POST, "/api/v1/games/1"));

        assert!(matches!(
            RouteRule::from_parts::<&str>("/x", &[], "nobody"),
            Err(PolicyError::Access(_))
        ));
        assert!(matches!(
            RouteRule::from_parts("/x", &["GE T"], "public"),
            Err(PolicyError::Method(_))
        ));
    }

    #[test]
    fn test_default_access_override() {
        let policy = RoutePolicy::new().with_default_access(Access::Public);
        assert!(policy.evaluate(&Method::GET, "/anything", None).is_ok());
    }
}
