// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration files through to a serving router.

use std::collections::HashMap;
use std::fs;

use axum::body::Body;
use axum::http::{Method, Request, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use levelup_api::ApiServer;
use levelup_bin::RuntimeBuilder;
use levelup_bin::runtime::seed_users;
use levelup_config::{
    AuditBackend, ConfigError, ConfigFormat, ConfigLoader, JwtAlgorithm, LevelupConfig, LogFormat,
    LogLevel, SameSite,
};
use levelup_tests::common::{init_test_logging, temp_test_dir};
use levelup_tests::prelude::*;

fn isolated_loader() -> ConfigLoader {
    ConfigLoader::new().with_vars(HashMap::new())
}

fn parse_yaml(content: &str) -> Result<LevelupConfig, ConfigError> {
    isolated_loader().load_from_str(content, ConfigFormat::Yaml)
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_yaml_file() {
    let dir = temp_test_dir("levelup-config");
    let path = dir.path().join("levelup.yaml");
    fs::write(&path, ConfigFixtures::full_yaml()).unwrap();

    let config = isolated_loader().load(&path).unwrap();

    assert_eq!(config.server.port, 9090);
    assert_eq!(config.security.jwt.expiration_secs, 3600);
    assert_eq!(config.security.jwt.algorithm, JwtAlgorithm::HS384);
    assert!(config.security.cookie.secure);
    assert_eq!(config.security.cookie.same_site, SameSite::Strict);
    assert_eq!(config.security.routes.rules.len(), 1);
    assert_eq!(config.audit.backend, AuditBackend::Memory);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.users.len(), 2);
    assert_eq!(config.users[1].roles, vec!["ADMIN".to_string()]);
}

#[test]
fn test_load_toml_file() {
    let dir = temp_test_dir("levelup-config");
    let path = dir.path().join("levelup.toml");
    fs::write(&path, ConfigFixtures::full_toml()).unwrap();

    let config = isolated_loader().load(&path).unwrap();

    assert_eq!(config.server.port, 9090);
    assert_eq!(config.security.jwt.algorithm, JwtAlgorithm::HS384);
    assert_eq!(config.security.routes.rules[0].access, "permitAll");
    assert_eq!(config.users.len(), 2);
}

#[test]
fn test_load_json_with_placeholder() {
    let dir = temp_test_dir("levelup-config");
    let path = dir.path().join("levelup.json");
    fs::write(&path, ConfigFixtures::placeholder_json()).unwrap();

    let config = ConfigLoader::builder()
        .var("LEVELUP_TEST_SECRET", TEST_SECRET)
        .build()
        .load(&path)
        .unwrap();

    assert_eq!(config.server.port, 9091);
    assert_eq!(
        config.security.jwt.secret.as_ref().map(|s| s.expose()),
        Some(TEST_SECRET)
    );

    // Without the variable the placeholder stays and fails base64 decoding.
    let err = isolated_loader().load(&path).unwrap_err();
    assert_eq!(err.field(), Some("security.jwt.secret"));
}

#[test]
fn test_prefixed_overrides() {
    let config = ConfigLoader::builder()
        .var("LEVELUP_SERVER_PORT", "7000")
        .var("LEVELUP_LOG_FORMAT", "compact")
        .build()
        .load_from_str(&ConfigFixtures::minimal_yaml(), ConfigFormat::Yaml)
        .unwrap();

    assert_eq!(config.server.port, 7000);
    assert_eq!(config.logging.format, LogFormat::Compact);
}

#[test]
fn test_missing_file() {
    let dir = temp_test_dir("levelup-config");
    let err = isolated_loader().load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.is_file_error());
}

#[test]
fn test_unknown_extension() {
    let dir = temp_test_dir("levelup-config");
    let path = dir.path().join("levelup.ini");
    fs::write(&path, "port = 1").unwrap();

    assert!(isolated_loader().load(&path).is_err());
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_secret_is_required() {
    let err = parse_yaml("server:\n  port: 8080\n").unwrap_err();
    assert_eq!(err.field(), Some("security.jwt.secret"));
}

#[test]
fn test_short_secret_is_rejected() {
    // "c2hvcnQ=" decodes to "short".
    let err = parse_yaml("security:\n  jwt:\n    secret: \"c2hvcnQ=\"\n").unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(err.field(), Some("security.jwt.secret"));
}

#[test]
fn test_same_site_none_requires_secure() {
    let yaml = format!(
        "{}  cookie:\n    same_site: none\n",
        ConfigFixtures::minimal_yaml()
    );
    let err = parse_yaml(&yaml).unwrap_err();
    assert_eq!(err.field(), Some("security.cookie.same_site"));

    let yaml = format!(
        "{}  cookie:\n    same_site: none\n    secure: true\n",
        ConfigFixtures::minimal_yaml()
    );
    assert!(parse_yaml(&yaml).is_ok());
}

#[test]
fn test_port_zero_is_rejected() {
    let yaml = format!("server:\n  port: 0\n{}", ConfigFixtures::minimal_yaml());
    let err = parse_yaml(&yaml).unwrap_err();
    assert_eq!(err.field(), Some("server.port"));
}

#[test]
fn test_duplicate_seed_user() {
    let yaml = format!(
        "{}users:\n  - subject: {}\n    password: a\n  - subject: {}\n    password: b\n",
        ConfigFixtures::minimal_yaml(),
        USER_EMAIL,
        USER_EMAIL
    );
    let err = parse_yaml(&yaml).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateUser { .. }));
}

#[test]
fn test_unknown_seed_role() {
    let yaml = format!(
        "{}users:\n  - subject: {}\n    password: secret123\n    roles: [ROOT]\n",
        ConfigFixtures::minimal_yaml(),
        USER_EMAIL
    );
    let err = parse_yaml(&yaml).unwrap_err();
    assert_eq!(err.field(), Some("users[0].roles"));
}

#[test]
fn test_invalid_route_access() {
    let yaml = format!(
        "{}  routes:\n    rules:\n      - pattern: /api/v1/games/**\n        access: \"role:ROOT\"\n",
        ConfigFixtures::minimal_yaml()
    );
    let err = parse_yaml(&yaml).unwrap_err();
    assert_eq!(err.field(), Some("security.routes.rules[0].access"));
}

#[test]
fn test_cors_credentials_require_explicit_origins() {
    let yaml = format!(
        "server:\n  cors:\n    allow_credentials: true\n{}",
        ConfigFixtures::minimal_yaml()
    );
    let err = parse_yaml(&yaml).unwrap_err();
    assert_eq!(err.field(), Some("server.cors.allow_credentials"));

    let yaml = format!(
        "server:\n  cors:\n    allowed_origins: [\"https://levelup.gg\"]\n    allow_credentials: true\n{}",
        ConfigFixtures::minimal_yaml()
    );
    let config = parse_yaml(&yaml).unwrap();
    assert_eq!(config.server.cors.allowed_headers, vec!["*".to_string()]);
}

#[test]
fn test_unknown_field_is_rejected() {
    let yaml = format!("{}unexpected: true\n", ConfigFixtures::minimal_yaml());
    assert!(parse_yaml(&yaml).is_err());
}

// =============================================================================
// Runtime Wiring
// =============================================================================

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or_default())
}

#[tokio::test]
async fn test_configured_service_end_to_end() {
    init_test_logging();

    let config = parse_yaml(&ConfigFixtures::full_yaml()).unwrap();
    let runtime = RuntimeBuilder::new().config(config).build().unwrap();
    let state = runtime.build_state().unwrap();

    let created = seed_users(&state, &runtime.config().users).await.unwrap();
    assert_eq!(created, 2);
    // Seeding is idempotent.
    assert_eq!(seed_users(&state, &runtime.config().users).await.unwrap(), 0);

    // Explicit origins with credentials and wildcard headers.
    assert!(state.config.cors.sends_credentials());
    let router = ApiServer::new(state.clone()).router();

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/auth/login")
        .header(header::ORIGIN, "https://levelup.gg")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(preflight).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type");

    let login = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&router, login).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expires_in"], 3600);

    let token = body["token"].as_str().unwrap().to_string();
    assert_token_authorities(state.jwt(), &token, &["ADMIN", "game:write"]);

    // The configured permitAll rule precedes the catalog read rule.
    let anonymous_read = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/games/42")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, anonymous_read).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let anonymous_write = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/games")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&router, anonymous_write).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_port_override_is_validated() {
    let config = parse_yaml(&ConfigFixtures::minimal_yaml()).unwrap();

    let runtime = RuntimeBuilder::new()
        .config(config.clone())
        .port(Some(9999))
        .build()
        .unwrap();
    assert_eq!(runtime.config().server.port, 9999);

    assert!(RuntimeBuilder::new().config(config).port(Some(0)).build().is_err());
}
