// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token authentication middleware.
//!
//! The layer never rejects a request for lacking a token; that decision
//! belongs to the gate. It only rejects requests that present a bearer token
//! which fails to decode.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use uuid::Uuid;

use crate::auth::{AuthContext, JwtManager};
use crate::error::ApiError;

/// Prefix of an `Authorization` header carrying a token.
pub const BEARER_PREFIX: &str = "Bearer ";

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for bearer token authentication.
///
/// A valid token binds an [`AuthContext`] into the request extensions.
#[derive(Clone)]
pub struct AuthLayer {
    jwt_manager: Arc<JwtManager>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(jwt_manager: Arc<JwtManager>) -> Self {
        Self { jwt_manager }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt_manager: self.jwt_manager.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for bearer token authentication.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt_manager: Arc<JwtManager>,
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let jwt_manager = self.jwt_manager.clone();
        // Call the instance poll_ready readied and leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(token) = extract_bearer_token(&req) else {
                return inner.call(req).await;
            };

            match jwt_manager.decode(&token) {
                Ok(decoded) => {
                    let client_ip = req
                        .extensions()
                        .get::<ConnectInfo<SocketAddr>>()
                        .map(|ci| ci.0.ip());

                    let auth_ctx = AuthContext::from_token(decoded)
                        .with_request_id(Uuid::now_v7())
                        .with_client_ip(client_ip);

                    tracing::debug!(subject = %auth_ctx.subject, "Request authenticated");
                    req.extensions_mut().insert(auth_ctx);
                    inner.call(req).await
                }
                Err(e) => {
                    tracing::debug!(error = %e, path = %req.uri().path(), "Token validation failed");
                    Ok(ApiError::from(e).into_response())
                }
            }
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
///
/// The prefix must be exactly `Bearer ` with one space; anything else is
/// treated as no token at all.
pub fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX).map(|s| s.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
