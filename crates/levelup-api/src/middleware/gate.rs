// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route authorization middleware.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    response::{IntoResponse, Response},
};
use levelup_core::{AuditLog, AuditLogger, NoOpAuditLogger};
use tower::{Layer, Service};

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::policy::RoutePolicy;

// =============================================================================
// GateLayer
// =============================================================================

/// Layer that applies a [`RoutePolicy`] to every request.
///
/// Must sit inside the [`AuthLayer`](super::AuthLayer) so the context is
/// already bound. Denials are audited.
#[derive(Clone)]
pub struct GateLayer {
    policy: Arc<RoutePolicy>,
    audit: Arc<dyn AuditLogger>,
}

impl GateLayer {
    /// Creates a gate for the policy.
    pub fn new(policy: Arc<RoutePolicy>) -> Self {
        Self {
            policy,
            audit: Arc::new(NoOpAuditLogger::new()),
        }
    }

    /// Sets the audit logger that records denials.
    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateMiddleware {
            inner,
            policy: self.policy.clone(),
            audit: self.audit.clone(),
        }
    }
}

// =============================================================================
// GateMiddleware
// =============================================================================

/// Middleware enforcing the route policy.
#[derive(Clone)]
pub struct GateMiddleware<S> {
    inner: S,
    policy: Arc<RoutePolicy>,
    audit: Arc<dyn AuditLogger>,
}

impl<S> Service<Request<Body>> for GateMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let policy = self.policy.clone();
        let audit = self.audit.clone();
        // Call the instance poll_ready readied and leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let context = req.extensions().get::<AuthContext>();
            let method = req.method().clone();
            let path = req.uri().path().to_string();

            let Err(denial) = policy.evaluate(&method, &path, context) else {
                return inner.call(req).await;
            };

            let actor = context.map(|c| c.subject.clone());
            let client_ip = context.and_then(|c| c.client_ip).or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ci| ci.0.ip())
            });

            tracing::warn!(
                method = %method,
                path = %path,
                subject = actor.as_deref().unwrap_or("anonymous"),
                reason = %denial.reason(),
                "Access denied"
            );

            let entry = AuditLog::access_denied(
                method.as_str(),
                &path,
                actor.as_deref(),
                client_ip,
                denial.reason(),
            );
            if let Err(e) = audit.log(entry).await {
                tracing::warn!(error = %e, "Failed to write audit log");
            }

            Ok(ApiError::from(denial).into_response())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
