// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! [`TestApp`] is the full router (auth layer, gate, handlers) over an
//! in-memory store with three seeded identities, driven with `oneshot`.
//! No socket is bound.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use levelup_api::auth::{BcryptHasher, PasswordHasher};
use levelup_api::{ApiConfig, ApiServer, AppState, JwtConfig, JwtManager, RoutePolicy};
use levelup_core::{Identity, IdentityStore, InMemoryAuditLogger, InMemoryIdentityStore, Role};

use super::fixtures::*;

// =============================================================================
// TestApp
// =============================================================================

/// An in-process LevelUp service.
pub struct TestApp {
    router: Router,
    state: AppState,
    audit: Arc<InMemoryAuditLogger>,
}

impl TestApp {
    /// Creates an app with the catalog policy and the default seed users.
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    /// Returns a builder.
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    /// Shared state behind the router.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Audit entries recorded so far.
    pub fn audit(&self) -> &InMemoryAuditLogger {
        &self.audit
    }

    /// Sends a request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    /// Sends a request with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("valid request")).await
    }

    /// `GET` with an optional bearer token.
    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, token, None).await
    }

    /// `POST` with a JSON body.
    pub async fn post_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::POST, path, token, Some(body)).await
    }

    /// `PUT` with a JSON body.
    pub async fn put_json(&self, path: &str, body: Value, token: Option<&str>) -> TestResponse {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    /// `DELETE` with an optional bearer token.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Logs in and returns the token from the `Authorization` header.
    ///
    /// Panics unless the login succeeds.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post_json(
                "/api/v1/auth/login",
                serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await;
        response.assert_status(StatusCode::OK);
        response
            .bearer_token()
            .expect("login response carries a bearer token")
    }

    /// Signs a token with the app's key, bypassing login.
    pub fn issue_token(&self, subject: &str, authorities: &[&str]) -> String {
        self.issue_token_at(subject, authorities, Utc::now())
    }

    /// Signs a token as if issued at `issued_at`.
    pub fn issue_token_at(&self, subject: &str, authorities: &[&str], issued_at: DateTime<Utc>) -> String {
        self.state
            .jwt()
            .issue(subject, authorities.iter().copied(), issued_at)
            .expect("signing succeeds")
            .token
    }

    /// Signs a token with a key the app does not know.
    pub fn foreign_token(&self, subject: &str) -> String {
        JwtManager::new(JwtConfig::new(OTHER_SECRET))
            .expect("valid secret")
            .issue(subject, ["USER"], Utc::now())
            .expect("signing succeeds")
            .token
    }
}

// =============================================================================
// TestAppBuilder
// =============================================================================

/// Builder for [`TestApp`].
pub struct TestAppBuilder {
    config: ApiConfig,
    policy: RoutePolicy,
    store: Option<Arc<dyn IdentityStore>>,
    hasher: Option<Arc<dyn PasswordHasher>>,
    seed: bool,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            config: ApiConfig::default().with_jwt(jwt_config()),
            policy: RoutePolicy::catalog(),
            store: None,
            hasher: None,
            seed: true,
        }
    }
}

impl TestAppBuilder {
    /// Replaces the route policy.
    pub fn policy(mut self, policy: RoutePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the API configuration. The token secret is kept.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses the given store. Seeding is skipped.
    pub fn store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.store = Some(store);
        self.seed = false;
        self
    }

    /// Uses the given password hasher.
    pub fn hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Skips the seed identities.
    pub fn without_seed(mut self) -> Self {
        self.seed = false;
        self
    }

    /// Builds the app and seeds the store.
    pub async fn build(self) -> TestApp {
        let audit = Arc::new(InMemoryAuditLogger::with_capacity(1_000));
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryIdentityStore::new()));
        let hasher = self
            .hasher
            .unwrap_or_else(|| Arc::new(BcryptHasher::new(TEST_BCRYPT_COST)));

        let state = AppState::builder()
            .config(self.config)
            .identity_store(store.clone())
            .password_hasher(hasher.clone())
            .route_policy(Arc::new(self.policy))
            .audit_logger(audit.clone())
            .build()
            .expect("test state builds");

        if self.seed {
            seed(store.as_ref(), hasher.as_ref()).await;
        }

        let router = ApiServer::new(state.clone()).router();

        TestApp {
            router,
            state,
            audit,
        }
    }
}

async fn seed(store: &dyn IdentityStore, hasher: &dyn PasswordHasher) {
    for (email, password, roles) in [
        (USER_EMAIL, USER_PASSWORD, vec![Role::User]),
        (ADMIN_EMAIL, ADMIN_PASSWORD, vec![Role::Admin]),
    ] {
        let hash = hasher.hash(password).await.expect("hashing succeeds");
        let created = store
            .create(Identity::active(email, hash, roles))
            .await
            .expect("seeding succeeds");
        assert!(created, "seed subject {} already present", email);
    }

    let hash = hasher.hash(PENDING_PASSWORD).await.expect("hashing succeeds");
    store
        .create(Identity::pending(PENDING_EMAIL, hash))
        .await
        .expect("seeding succeeds");
}

// =============================================================================
// TestResponse
// =============================================================================

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body parsed as JSON, `Null` when it is not JSON.
    pub body: Value,
    /// Raw body text.
    pub text: String,
}

impl TestResponse {
    /// The token from `Authorization: Bearer <token>`, if present.
    pub fn bearer_token(&self) -> Option<String> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    }

    /// All `Set-Cookie` values.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    /// The `error.code` field of an error body.
    pub fn error_code(&self) -> Option<&str> {
        self.body["error"]["code"].as_str()
    }
}
