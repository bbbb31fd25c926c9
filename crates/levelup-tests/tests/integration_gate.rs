// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route gate decisions and token verification over HTTP.

use axum::body::Body;
use axum::http::{Method, Request, header};
use chrono::{Duration, Utc};
use serde_json::json;

use levelup_api::RoutePolicy;
use levelup_core::{Access, AuditAction, Role};
use levelup_tests::prelude::*;

// =============================================================================
// Catalog Resources
// =============================================================================

#[tokio::test]
async fn test_anonymous_catalog_read_is_unauthorized() {
    let app = TestApp::new().await;

    for path in ["/api/v1/games/1", "/api/v1/genres", "/api/v1/developers/7"] {
        app.get(path, None)
            .await
            .assert_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_user_reads_but_cannot_write_catalog() {
    let app = TestApp::new().await;
    let token = app.login(USER_EMAIL, USER_PASSWORD).await;

    app.get("/api/v1/games/1", Some(&token)).await.assert_passed_gate();
    app.request(Method::HEAD, "/api/v1/genres/2", Some(&token), None)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.post_json("/api/v1/games", json!({ "title": "Celeste" }), Some(&token))
        .await
        .assert_error(StatusCode::FORBIDDEN, "FORBIDDEN");
    app.put_json("/api/v1/developers/3", json!({}), Some(&token))
        .await
        .assert_error(StatusCode::FORBIDDEN, "FORBIDDEN");
    app.delete("/api/v1/genres/2", Some(&token))
        .await
        .assert_error(StatusCode::FORBIDDEN, "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_writes_catalog() {
    let app = TestApp::new().await;
    let token = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    app.post_json("/api/v1/games", json!({ "title": "Celeste" }), Some(&token))
        .await
        .assert_passed_gate();
    app.delete("/api/v1/developers/3", Some(&token))
        .await
        .assert_passed_gate();
}

#[tokio::test]
async fn test_gate_checks_authorities_not_role_names() {
    let app = TestApp::new().await;

    // A USER token carrying a write permission it was granted out of band.
    let token = app.issue_token(USER_EMAIL, &["USER", "game:write"]);
    app.post_json("/api/v1/games", json!({}), Some(&token))
        .await
        .assert_passed_gate();
    app.get("/api/v1/games/1", Some(&token))
        .await
        .assert_error(StatusCode::FORBIDDEN, "FORBIDDEN");
}

#[tokio::test]
async fn test_denials_are_audited() {
    let app = TestApp::new().await;
    let token = app.login(USER_EMAIL, USER_PASSWORD).await;

    app.get("/api/v1/games/1", None).await;
    app.delete("/api/v1/games/1", Some(&token)).await;

    let denied = app.audit().entries_for_action(AuditAction::AccessDenied);
    assert_eq!(denied.len(), 2);
    assert!(denied.iter().any(|e| e.actor.as_deref() == Some(USER_EMAIL)));
    assert!(denied.iter().any(|e| e.actor.is_none()));
}

// =============================================================================
// Administration
// =============================================================================

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = TestApp::new().await;
    let user = app.login(USER_EMAIL, USER_PASSWORD).await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let path = format!("/api/v1/admin/users/{}", USER_EMAIL);

    app.get(&path, None)
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    app.get(&path, Some(&user))
        .await
        .assert_error(StatusCode::FORBIDDEN, "FORBIDDEN");

    let response = app.get(&path, Some(&admin)).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body["subject"], USER_EMAIL);
    assert_eq!(response.body["roles"], json!(["USER"]));
    assert!(response.body.get("password_hash").is_none());

    app.get("/api/v1/admin/users/nobody@levelup.gg", Some(&admin))
        .await
        .assert_error(StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_role_change_applies_at_next_login() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let before = app.login(USER_EMAIL, USER_PASSWORD).await;

    let response = app
        .put_json(
            &format!("/api/v1/admin/users/{}/roles", USER_EMAIL),
            json!({ "roles": ["USER", "ADMIN"] }),
            Some(&admin),
        )
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body["roles"], json!(["USER", "ADMIN"]));

    // Tokens are snapshots of the roles at issue time.
    assert_token_lacks(app.state().jwt(), &before, &["ADMIN", "game:write"]);
    app.post_json("/api/v1/games", json!({}), Some(&before))
        .await
        .assert_error(StatusCode::FORBIDDEN, "FORBIDDEN");

    let after = app.login(USER_EMAIL, USER_PASSWORD).await;
    assert_token_authorities(app.state().jwt(), &after, &["USER", "ADMIN", "game:write"]);
    app.post_json("/api/v1/games", json!({}), Some(&after))
        .await
        .assert_passed_gate();

    assert_eq!(app.audit().entries_for_action(AuditAction::RoleChange).len(), 1);
}

#[tokio::test]
async fn test_role_assignment_is_validated() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let path = format!("/api/v1/admin/users/{}/roles", USER_EMAIL);

    app.put_json(&path, json!({ "roles": [] }), Some(&admin))
        .await
        .assert_error(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
    app.put_json(&path, json!({ "roles": ["SUPERUSER"] }), Some(&admin))
        .await
        .assert_error(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_remove_user() {
    let app = TestApp::new().await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let path = format!("/api/v1/admin/users/{}", USER_EMAIL);

    app.delete(&path, Some(&admin))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.delete(&path, Some(&admin))
        .await
        .assert_error(StatusCode::NOT_FOUND, "NOT_FOUND");

    app.post_json(
        "/api/v1/auth/login",
        json!({ "email": USER_EMAIL, "password": USER_PASSWORD }),
        None,
    )
    .await
    .assert_error(StatusCode::NOT_FOUND, "NOT_FOUND");
    assert_eq!(app.audit().entries_for_action(AuditAction::AccountRemoved).len(), 1);
}

// =============================================================================
// Token Verification
// =============================================================================

#[tokio::test]
async fn test_malformed_token() {
    let app = TestApp::new().await;
    app.get("/api/v1/auth/me", Some("not-a-jwt"))
        .await
        .assert_error(StatusCode::BAD_REQUEST, "MALFORMED_TOKEN");
}

#[tokio::test]
async fn test_expired_token() {
    let app = TestApp::new().await;
    let token = app.issue_token_at(USER_EMAIL, &["USER"], Utc::now() - Duration::weeks(3));

    app.get("/api/v1/auth/me", Some(&token))
        .await
        .assert_error(StatusCode::BAD_REQUEST, "EXPIRED_TOKEN");
}

#[tokio::test]
async fn test_token_signed_with_other_key() {
    let app = TestApp::new().await;
    let token = app.foreign_token(ADMIN_EMAIL);

    let response = app.get("/api/v1/admin/users/user@user.com", Some(&token)).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.error_code().is_some_and(|c| c.ends_with("_TOKEN")));
}

#[tokio::test]
async fn test_token_is_rejected_even_on_public_routes() {
    let app = TestApp::new().await;
    app.get("/health", Some("garbage"))
        .await
        .assert_error(StatusCode::BAD_REQUEST, "MALFORMED_TOKEN");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_anonymous() {
    let app = TestApp::new().await;
    let token = app.login(USER_EMAIL, USER_PASSWORD).await;

    for value in [format!("Basic {}", token), format!("bearer {}", token), token.clone()] {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/v1/auth/me")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();

        app.send(request)
            .await
            .assert_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_cookie_alone_does_not_authenticate() {
    let app = TestApp::new().await;
    let token = app.login(USER_EMAIL, USER_PASSWORD).await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/auth/me")
        .header(header::COOKIE, format!("Authorization=Bearer%20{}", token))
        .body(Body::empty())
        .unwrap();

    app.send(request)
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

// =============================================================================
// Custom Policies
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let response = app.get("/health", None).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.body["status"], "ok");

    app.get("/ready", None).await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_public_rule_ahead_of_catalog() {
    let mut policy = RoutePolicy::new().route_for(
        &[Method::GET, Method::HEAD],
        "/api/v1/games/**",
        Access::Public,
    );
    for rule in RoutePolicy::catalog().rules() {
        policy = policy.with_rule(rule.clone());
    }

    let app = TestApp::builder().policy(policy).build().await;

    app.get("/api/v1/games/1", None).await.assert_passed_gate();
    app.post_json("/api/v1/games", json!({}), None)
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
    app.get("/api/v1/genres/1", None)
        .await
        .assert_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_default_access_applies_to_unmatched_routes() {
    let policy = RoutePolicy::catalog().with_default_access(Access::Role(Role::Admin));
    let app = TestApp::builder().policy(policy).build().await;
    let user = app.login(USER_EMAIL, USER_PASSWORD).await;
    let admin = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    app.get("/api/v1/reviews/1", Some(&user))
        .await
        .assert_error(StatusCode::FORBIDDEN, "FORBIDDEN");
    app.get("/api/v1/reviews/1", Some(&admin))
        .await
        .assert_passed_gate();
}
