// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Seed identities, a signing secret and configuration documents shared by
//! the integration suites.

use levelup_api::JwtConfig;

// =============================================================================
// Identities
// =============================================================================

/// Seeded user with the `USER` role.
pub const USER_EMAIL: &str = "user@user.com";
/// Password of [`USER_EMAIL`].
pub const USER_PASSWORD: &str = "user12345";

/// Seeded user with the `ADMIN` role.
pub const ADMIN_EMAIL: &str = "admin@admin.com";
/// Password of [`ADMIN_EMAIL`].
pub const ADMIN_PASSWORD: &str = "admin12345";

/// Seeded identity that was never activated.
pub const PENDING_EMAIL: &str = "pending@levelup.gg";
/// Password of [`PENDING_EMAIL`].
pub const PENDING_PASSWORD: &str = "pending12345";

/// bcrypt cost used in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

// =============================================================================
// Tokens
// =============================================================================

/// Base64 of "levelup-test-secret-key-that-is-long-enough".
pub const TEST_SECRET: &str = "bGV2ZWx1cC10ZXN0LXNlY3JldC1rZXktdGhhdC1pcy1sb25nLWVub3VnaA==";

/// A different valid secret, for tokens the service must reject.
pub const OTHER_SECRET: &str = "YW5vdGhlci1zZWNyZXQta2V5LXRoYXQtaXMtYWxzby1sb25nLWVub3VnaA==";

/// Token configuration used by the harness.
pub fn jwt_config() -> JwtConfig {
    JwtConfig::new(TEST_SECRET)
}

// =============================================================================
// Configuration Documents
// =============================================================================

/// Configuration document fixtures.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// The smallest valid YAML document.
    pub fn minimal_yaml() -> String {
        format!("security:\n  jwt:\n    secret: \"{}\"\n", TEST_SECRET)
    }

    /// A YAML document touching every section.
    pub fn full_yaml() -> String {
        format!(
            r#"
server:
  host: 127.0.0.1
  port: 9090
  request_timeout_secs: 10
  cors:
    allowed_origins: ["https://levelup.gg"]
    allow_credentials: true
security:
  jwt:
    secret: "{TEST_SECRET}"
    expiration_secs: 3600
    algorithm: HS384
  cookie:
    secure: true
    same_site: strict
  password:
    bcrypt_cost: {TEST_BCRYPT_COST}
  routes:
    rules:
      - pattern: /api/v1/games/**
        methods: [GET, HEAD]
        access: permitAll
audit:
  backend: memory
  memory_capacity: 500
logging:
  level: debug
  format: json
users:
  - subject: {USER_EMAIL}
    password: {USER_PASSWORD}
  - subject: {ADMIN_EMAIL}
    password: {ADMIN_PASSWORD}
    roles: [ADMIN]
"#
        )
    }

    /// The same content as [`full_yaml`](Self::full_yaml) in TOML.
    pub fn full_toml() -> String {
        format!(
            r#"
[server]
host = "127.0.0.1"
port = 9090

[security.jwt]
secret = "{TEST_SECRET}"
expiration_secs = 3600
algorithm = "HS384"

[security.password]
bcrypt_cost = {TEST_BCRYPT_COST}

[[security.routes.rules]]
pattern = "/api/v1/games/**"
methods = ["GET", "HEAD"]
access = "permitAll"

[audit]
backend = "memory"

[[users]]
subject = "{USER_EMAIL}"
password = "{USER_PASSWORD}"

[[users]]
subject = "{ADMIN_EMAIL}"
password = "{ADMIN_PASSWORD}"
roles = ["ADMIN"]
"#
        )
    }

    /// A JSON document with a placeholder secret.
    pub fn placeholder_json() -> String {
        r#"{
  "server": { "port": 9091 },
  "security": { "jwt": { "secret": "${LEVELUP_TEST_SECRET}" } }
}"#
        .to_string()
    }
}
