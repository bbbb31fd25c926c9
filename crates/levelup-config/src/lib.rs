// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # levelup-config
//!
//! Configuration management for the LevelUp catalog security service.
//!
//! ## Features
//!
//! - **Schema Definition**: Server, token, cookie, password, route table,
//!   audit, logging and seed user settings, each with validation
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `LEVELUP_*` variables and `${VAR:default}`
//!   placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use levelup_config::loader::load_config;
//!
//! let config = load_config("levelup.yaml").unwrap();
//!
//! println!("Port: {}", config.server.port);
//! println!("Seed users: {}", config.users.len());
//! ```
//!
//! ## Example
//!
//! ```yaml
//! server:
//!   port: 8080
//! security:
//!   jwt:
//!     secret: "${LEVELUP_JWT_SECRET}"
//!     expiration_secs: 1209600
//!   routes:
//!     rules:
//!       - pattern: /api/v1/games/**
//!         methods: [GET]
//!         access: permitAll
//! users:
//!   - subject: admin@levelup.gg
//!     password_hash: "$2b$10$..."
//!     roles: [ADMIN]
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ConfigFormat, ConfigLoader, ConfigLoaderBuilder, DEFAULT_ENV_PREFIX, load_config,
    load_config_str,
};
pub use schema::{
    AuditBackend, AuditConfig, CookieConfig, CorsConfig, JwtAlgorithm, JwtConfig, LevelupConfig,
    LogFormat, LogLevel, LoggingConfig, PasswordConfig, RouteRuleConfig, RoutesConfig, SameSite,
    SecretValue, SecurityConfig, SeedUserConfig, ServerConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(NAME, "levelup-config");
    }
}
