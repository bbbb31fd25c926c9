// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for LevelUp.
//!
//! # Schema Structure
//!
//! ```text
//! LevelupConfig
//! ├── server: ServerConfig
//! │   └── cors: CorsConfig
//! ├── security: SecurityConfig
//! │   ├── jwt: JwtConfig
//! │   ├── cookie: CookieConfig
//! │   ├── password: PasswordConfig
//! │   └── routes: RoutesConfig
//! ├── audit: AuditConfig
//! ├── logging: LoggingConfig
//! └── users: Vec<SeedUserConfig>
//! ```

use crate::error::{ConfigError, ConfigResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use levelup_core::{Access, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default token lifetime in seconds (two weeks).
pub const DEFAULT_JWT_EXPIRATION_SECS: i64 = 14 * 24 * 60 * 60;

/// Minimum decoded secret length in bytes for HMAC signing.
pub const MIN_SECRET_BYTES: usize = 32;

/// Default bcrypt cost.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// HTTP methods accepted in route rules.
pub const KNOWN_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "TRACE", "CONNECT",
];

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure for LevelUp.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelupConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Security configuration.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Audit trail configuration.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Identities seeded into the store at startup.
    #[serde(default)]
    pub users: Vec<SeedUserConfig>,
}

impl LevelupConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.security.validate()?;

        let mut subjects = HashSet::new();
        for (index, user) in self.users.iter().enumerate() {
            if !subjects.insert(user.subject.trim()) {
                return Err(ConfigError::duplicate_user(&user.subject));
            }
            user.validate(index)?;
        }

        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> u64 {
    30
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::validation("server.port", "cannot be zero"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout_secs",
                "cannot be zero",
            ));
        }
        self.cors.validate()?;
        Ok(())
    }

    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the shutdown timeout as a Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (use "*" for all).
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,

    /// Allowed methods.
    #[serde(default = "default_methods")]
    pub allowed_methods: Vec<String>,

    /// Allowed headers.
    #[serde(default = "default_headers")]
    pub allowed_headers: Vec<String>,

    /// Allow credentials.
    #[serde(default)]
    pub allow_credentials: bool,

    /// Max age in seconds.
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_methods() -> Vec<String> {
    ["GET", "HEAD", "POST", "PUT", "DELETE", "OPTIONS"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_headers() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_age() -> u64 {
    3600
}

impl CorsConfig {
    /// Validates the CORS configuration.
    ///
    /// Wildcard headers and methods are echoed back when credentials are on,
    /// a wildcard origin cannot be.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.allowed_origins.is_empty() {
            return Err(ConfigError::validation(
                "server.cors.allowed_origins",
                "must list at least one origin",
            ));
        }
        if self.allowed_methods.is_empty() {
            return Err(ConfigError::validation(
                "server.cors.allowed_methods",
                "must list at least one method",
            ));
        }
        if self.allow_credentials && self.allows_any_origin() {
            return Err(ConfigError::validation(
                "server.cors.allow_credentials",
                "cannot be combined with a \"*\" origin",
            ));
        }
        Ok(())
    }

    /// Returns `true` if any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
            allowed_methods: default_methods(),
            allowed_headers: default_headers(),
            allow_credentials: false,
            max_age_secs: default_max_age(),
        }
    }
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Security configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Token configuration.
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Authorization cookie configuration.
    #[serde(default)]
    pub cookie: CookieConfig,

    /// Password policy and hashing.
    #[serde(default)]
    pub password: PasswordConfig,

    /// Route access table.
    #[serde(default)]
    pub routes: RoutesConfig,
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.jwt.validate()?;
        self.cookie.validate()?;
        self.password.validate()?;
        self.routes.validate()?;
        Ok(())
    }
}

/// Token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwtConfig {
    /// Base64 encoded HMAC secret. Required.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// Token lifetime in seconds.
    #[serde(default = "default_jwt_expiration")]
    pub expiration_secs: i64,

    /// HMAC algorithm.
    #[serde(default)]
    pub algorithm: JwtAlgorithm,

    /// Clock skew allowance in seconds.
    #[serde(default)]
    pub leeway_secs: u64,
}

fn default_jwt_expiration() -> i64 {
    DEFAULT_JWT_EXPIRATION_SECS
}

impl JwtConfig {
    /// Validates the token configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let secret = self.secret.as_ref().ok_or_else(|| {
            ConfigError::validation("security.jwt.secret", "secret is required")
        })?;

        let decoded = BASE64.decode(secret.expose().trim()).map_err(|e| {
            ConfigError::validation("security.jwt.secret", format!("not valid base64: {}", e))
        })?;
        if decoded.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::validation(
                "security.jwt.secret",
                format!("must decode to at least {} bytes", MIN_SECRET_BYTES),
            ));
        }

        if self.expiration_secs <= 0 {
            return Err(ConfigError::validation(
                "security.jwt.expiration_secs",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Returns the expiration as a Duration.
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expiration_secs.max(0) as u64)
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            expiration_secs: DEFAULT_JWT_EXPIRATION_SECS,
            algorithm: JwtAlgorithm::default(),
            leeway_secs: 0,
        }
    }
}

/// HMAC signing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256.
    #[default]
    HS256,
    /// HMAC using SHA-384.
    HS384,
    /// HMAC using SHA-512.
    HS512,
}

/// Authorization cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CookieConfig {
    /// Whether login sets the cookie.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Cookie path.
    #[serde(default = "default_cookie_path")]
    pub path: String,

    /// Cookie domain.
    #[serde(default)]
    pub domain: Option<String>,

    /// HttpOnly flag.
    #[serde(default = "default_true")]
    pub http_only: bool,

    /// Secure flag.
    #[serde(default)]
    pub secure: bool,

    /// SameSite attribute.
    #[serde(default)]
    pub same_site: SameSite,
}

fn default_true() -> bool {
    true
}

fn default_cookie_name() -> String {
    "Authorization".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl CookieConfig {
    /// Validates the cookie configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation("security.cookie.name", "cannot be empty"));
        }
        if self.same_site == SameSite::None && !self.secure {
            return Err(ConfigError::validation(
                "security.cookie.same_site",
                "SameSite=None requires secure cookies",
            ));
        }
        Ok(())
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: default_cookie_name(),
            path: default_cookie_path(),
            domain: None,
            http_only: true,
            secure: false,
            same_site: SameSite::default(),
        }
    }
}

/// Cookie SameSite attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Strict.
    Strict,
    /// Lax.
    #[default]
    Lax,
    /// None. Requires `secure`.
    None,
}

/// Password policy and hashing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum length in bytes.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Maximum length in bytes. bcrypt ignores anything past 72.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// bcrypt cost factor.
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_min_length() -> usize {
    8
}

fn default_max_length() -> usize {
    72
}

fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}

impl PasswordConfig {
    /// Validates the password configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_length == 0 {
            return Err(ConfigError::validation(
                "security.password.min_length",
                "cannot be zero",
            ));
        }
        if self.max_length > 72 || self.min_length > self.max_length {
            return Err(ConfigError::validation(
                "security.password.max_length",
                "must be between min_length and 72",
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::validation(
                "security.password.bcrypt_cost",
                "must be between 4 and 31",
            ));
        }
        Ok(())
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

/// Route access table.
///
/// Configured rules are checked before the built-in catalog rules, so they
/// can open up or tighten any catalog route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesConfig {
    /// Access for requests no rule matches.
    #[serde(default = "default_access")]
    pub default_access: String,

    /// Whether the built-in catalog rules follow the configured ones.
    #[serde(default = "default_true")]
    pub include_catalog: bool,

    /// Additional rules, first match wins.
    #[serde(default)]
    pub rules: Vec<RouteRuleConfig>,
}

fn default_access() -> String {
    "authenticated".to_string()
}

impl RoutesConfig {
    /// Validates the route table.
    pub fn validate(&self) -> ConfigResult<()> {
        Access::parse(&self.default_access).map_err(|e| {
            ConfigError::validation("security.routes.default_access", e.to_string())
        })?;

        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate(index)?;
        }
        Ok(())
    }
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            default_access: default_access(),
            include_catalog: true,
            rules: Vec::new(),
        }
    }
}

/// A configured route rule.
///
/// ```yaml
/// - pattern: /api/v1/games/**
///   methods: [GET]
///   access: permitAll
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteRuleConfig {
    /// Ant-style path pattern.
    pub pattern: String,

    /// Methods the rule applies to. Empty means every method.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Access expression, e.g. `role:ADMIN` or `hasAuthority('game:write')`.
    pub access: String,
}

impl RouteRuleConfig {
    /// Validates the rule.
    pub fn validate(&self, index: usize) -> ConfigResult<()> {
        let field = |name: &str| format!("security.routes.rules[{}].{}", index, name);

        if !self.pattern.starts_with('/') {
            return Err(ConfigError::validation(field("pattern"), "must start with '/'"));
        }
        let partial_wildcard = self
            .pattern
            .split('/')
            .any(|segment| segment.contains('*') && segment != "*" && segment != "**");
        if partial_wildcard {
            return Err(ConfigError::validation(
                field("pattern"),
                "wildcards must span a whole segment",
            ));
        }

        for method in &self.methods {
            if !KNOWN_METHODS.contains(&method.to_ascii_uppercase().as_str()) {
                return Err(ConfigError::validation(
                    field("methods"),
                    format!("unknown method '{}'", method),
                ));
            }
        }

        Access::parse(&self.access)
            .map_err(|e| ConfigError::validation(field("access"), e.to_string()))?;

        Ok(())
    }
}

// =============================================================================
// Audit Configuration
// =============================================================================

/// Audit trail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Whether audit entries are recorded.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Where entries go.
    #[serde(default)]
    pub backend: AuditBackend,

    /// Entries kept by the memory backend.
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

fn default_memory_capacity() -> usize {
    10_000
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: AuditBackend::default(),
            memory_capacity: default_memory_capacity(),
        }
    }
}

/// Audit backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditBackend {
    /// Emit entries as `tracing` events on the `audit` target.
    #[default]
    Tracing,
    /// Keep entries in a bounded in-memory buffer.
    Memory,
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as an `EnvFilter` directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable text.
    #[default]
    #[serde(alias = "pretty")]
    Text,
    /// Single line text.
    Compact,
    /// JSON lines.
    Json,
}

impl LogFormat {
    /// Parses a format name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

// =============================================================================
// Seed Users
// =============================================================================

/// An identity created at startup if it does not exist yet.
///
/// Exactly one of `password` and `password_hash` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUserConfig {
    /// Email subject.
    pub subject: String,

    /// Plain password, hashed at startup.
    #[serde(default)]
    pub password: Option<SecretValue>,

    /// Precomputed bcrypt hash.
    #[serde(default)]
    pub password_hash: Option<SecretValue>,

    /// Role names.
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,

    /// Whether the identity starts enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_roles() -> Vec<String> {
    vec![Role::User.as_str().to_string()]
}

impl SeedUserConfig {
    /// Validates the seed user.
    pub fn validate(&self, index: usize) -> ConfigResult<()> {
        let field = |name: &str| format!("users[{}].{}", index, name);

        if self.subject.trim().is_empty() {
            return Err(ConfigError::validation(field("subject"), "cannot be empty"));
        }

        match (&self.password, &self.password_hash) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::validation(
                    field("password"),
                    "set either password or password_hash, not both",
                ));
            }
            (None, None) => {
                return Err(ConfigError::validation(
                    field("password"),
                    "password or password_hash is required",
                ));
            }
            _ => {}
        }

        if self.roles.is_empty() {
            return Err(ConfigError::validation(field("roles"), "at least one role is required"));
        }
        self.parsed_roles()
            .map_err(|name| ConfigError::validation(field("roles"), format!("unknown role '{}'", name)))?;

        Ok(())
    }

    /// Parses the role names, returning the first unknown name on failure.
    pub fn parsed_roles(&self) -> Result<Vec<Role>, String> {
        self.roles
            .iter()
            .map(|name| Role::parse(name).ok_or_else(|| name.clone()))
            .collect()
    }
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret string that never prints its content.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "bGV2ZWx1cC10ZXN0LXNlY3JldC1rZXktdGhhdC1pcy1sb25nLWVub3VnaA==";

    fn valid_config() -> LevelupConfig {
        let mut config = LevelupConfig::default();
        config.security.jwt.secret = Some(SecretValue::new(SECRET));
        config
    }

    #[test]
    fn test_defaults() {
        let config = LevelupConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.security.jwt.expiration_secs, 1_209_600);
        assert_eq!(config.security.jwt.algorithm, JwtAlgorithm::HS256);
        assert!(config.security.cookie.http_only);
        assert_eq!(config.security.routes.default_access, "authenticated");
        assert!(config.security.routes.include_catalog);
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_cors_credentials_with_wildcard_headers() {
        let mut config = valid_config();
        config.server.cors.allowed_origins = vec!["https://levelup.gg".to_string()];
        config.server.cors.allow_credentials = true;
        assert_eq!(config.server.cors.allowed_headers, vec!["*".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cors_credentials_with_any_origin() {
        let mut config = valid_config();
        config.server.cors.allow_credentials = true;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("server.cors.allow_credentials"));

        config.server.cors.allow_credentials = false;
        config.server.cors.allowed_methods.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("server.cors.allowed_methods"));
    }

    #[test]
    fn test_secret_required() {
        let err = LevelupConfig::default().validate().unwrap_err();
        assert_eq!(err.field(), Some("security.jwt.secret"));

        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_secret_must_be_long_base64() {
        let mut config = valid_config();
        config.security.jwt.secret = Some(SecretValue::new("not base64 !!"));
        assert!(config.validate().is_err());

        config.security.jwt.secret = Some(SecretValue::new("c2hvcnQ="));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = valid_config();
        config.server.port = 0;
        assert_eq!(config.validate().unwrap_err().field(), Some("server.port"));
    }

    #[test]
    fn test_route_rule_validation() {
        let rule = RouteRuleConfig {
            pattern: "/api/v1/games/**".to_string(),
            methods: vec!["get".to_string()],
            access: "hasAuthority('game:read')".to_string(),
        };
        assert!(rule.validate(0).is_ok());

        let bad_access = RouteRuleConfig {
            access: "role:GUEST".to_string(),
            ..rule.clone()
        };
        assert_eq!(
            bad_access.validate(2).unwrap_err().field(),
            Some("security.routes.rules[2].access")
        );

        let bad_pattern = RouteRuleConfig {
            pattern: "/api/v1/game*".to_string(),
            ..rule.clone()
        };
        assert!(bad_pattern.validate(0).is_err());

        let bad_method = RouteRuleConfig {
            methods: vec!["FETCH".to_string()],
            ..rule
        };
        assert!(bad_method.validate(0).is_err());
    }

    #[test]
    fn test_seed_user_validation() {
        let user = SeedUserConfig {
            subject: "admin@levelup.gg".to_string(),
            password: Some(SecretValue::new("admin12345")),
            password_hash: None,
            roles: vec!["ADMIN".to_string(), "user".to_string()],
            enabled: true,
        };
        assert!(user.validate(0).is_ok());
        assert_eq!(user.parsed_roles().unwrap(), vec![Role::Admin, Role::User]);

        let both = SeedUserConfig {
            password_hash: Some(SecretValue::new("$2b$04$abc")),
            ..user.clone()
        };
        assert!(both.validate(0).is_err());

        let unknown_role = SeedUserConfig {
            roles: vec!["OWNER".to_string()],
            ..user
        };
        assert_eq!(unknown_role.parsed_roles().unwrap_err(), "OWNER");
        assert!(unknown_role.validate(0).is_err());
    }

    #[test]
    fn test_duplicate_seed_users() {
        let user = SeedUserConfig {
            subject: "user@user.com".to_string(),
            password: Some(SecretValue::new("user12345")),
            password_hash: None,
            roles: default_roles(),
            enabled: true,
        };

        let mut config = valid_config();
        config.users = vec![user.clone(), user];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateUser { .. })
        ));
    }

    #[test]
    fn test_same_site_none_requires_secure() {
        let mut config = valid_config();
        config.security.cookie.same_site = SameSite::None;
        assert!(config.validate().is_err());

        config.security.cookie.secure = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secret_value_redacted() {
        let secret = SecretValue::new("hunter2");
        assert_eq!(secret.to_string(), "***");
        assert!(!format!("{:?}", secret).contains("hunter2"));
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_log_level_and_format_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("loud"), None);
        assert_eq!(LogFormat::parse("pretty"), Some(LogFormat::Text));
        assert_eq!(LogFormat::parse("json"), Some(LogFormat::Json));
    }
}
