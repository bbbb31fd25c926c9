// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, GateLayer};
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    ///
    /// Layers run outermost first: trace, timeout, CORS, authentication,
    /// then the gate.
    pub fn router(&self) -> Router {
        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(create_cors_layer(&self.config))
            .layer(AuthLayer::new(self.state.jwt().clone()))
            .layer(
                GateLayer::new(self.state.route_policy.clone())
                    .with_audit_logger(self.state.audit_logger.clone()),
            );

        Router::new()
            // Health
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            // Authentication
            .route("/api/v1/auth/login", post(handlers::login))
            .route("/api/v1/auth/logout", post(handlers::logout))
            .route("/api/v1/auth/register", post(handlers::register))
            .route("/api/v1/auth/activate/{token}", get(handlers::activate))
            .route("/api/v1/auth/me", get(handlers::current_user))
            .route("/api/v1/auth/change-password", post(handlers::change_password))
            // Administration
            .route(
                "/api/v1/admin/users/{subject}",
                get(handlers::get_user).delete(handlers::remove_user),
            )
            .route("/api/v1/admin/users/{subject}/roles", put(handlers::assign_roles))
            .fallback(fallback)
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serves on an already bound listener.
    pub async fn serve(
        self,
        listener: tokio::net::TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let router = self.router();
        let addr = listener.local_addr().unwrap_or_else(|_| self.addr());

        info!("Starting API server on {}", addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }

    /// Returns the shared state.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Routes the gate let through but no handler serves.
async fn fallback() -> ApiError {
    ApiError::not_found("Route")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// tower-http refuses wildcard answers alongside credentials, so with
/// credentials on a `*` method or header list is echoed from the preflight.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;
    let credentials = cors.sends_credentials();

    let mut layer = CorsLayer::new()
        .max_age(Duration::from_secs(cors.max_age))
        .expose_headers([header::AUTHORIZATION]);

    layer = if cors.allows_any_origin() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    };

    layer = match (cors.allows_any_method(), credentials) {
        (true, true) => layer.allow_methods(AllowMethods::mirror_request()),
        (true, false) => layer.allow_methods(Any),
        (false, _) => {
            let methods: Vec<Method> = cors
                .allowed_methods
                .iter()
                .filter_map(|m| m.parse().ok())
                .collect();
            layer.allow_methods(methods)
        }
    };

    layer = match (cors.allows_any_header(), credentials) {
        (true, true) => layer.allow_headers(AllowHeaders::mirror_request()),
        (true, false) => layer.allow_headers(Any),
        (false, _) => {
            let headers: Vec<HeaderName> = cors
                .allowed_headers
                .iter()
                .filter_map(|h| h.parse().ok())
                .collect();
            layer.allow_headers(headers)
        }
    };

    layer.allow_credentials(credentials)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::config::CorsConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_server() -> ApiServer {
        let config = ApiConfig::default().with_jwt(JwtConfig::new(
            "bGV2ZWx1cC10ZXN0LXNlY3JldC1rZXktdGhhdC1pcy1sb25nLWVub3VnaA==",
        ));
        ApiServer::new(AppState::builder().config(config).build().unwrap())
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(test_server().addr().port(), 8080);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = test_server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_requires_auth() {
        let response = test_server()
            .router()
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cors_exposes_authorization() {
        let response = test_server()
            .router()
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "https://levelup.gg")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let exposed = response.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(exposed.contains("authorization"));
    }

    fn credentialed_server(cors: CorsConfig) -> ApiServer {
        let config = ApiConfig::default()
            .with_jwt(JwtConfig::new(
                "bGV2ZWx1cC10ZXN0LXNlY3JldC1rZXktdGhhdC1pcy1sb25nLWVub3VnaA==",
            ))
            .with_cors(cors);
        ApiServer::new(AppState::builder().config(config).build().unwrap())
    }

    #[tokio::test]
    async fn test_cors_credentials_mirror_wildcard_headers() {
        let cors = CorsConfig {
            allowed_origins: vec!["https://levelup.gg".to_string()],
            allowed_methods: vec!["*".to_string()],
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert!(cors.allows_any_header());

        let response = credentialed_server(cors)
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/v1/auth/login")
                    .header(header::ORIGIN, "https://levelup.gg")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://levelup.gg");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    }

    #[tokio::test]
    async fn test_cors_credentials_ignored_for_any_origin() {
        let cors = CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        };

        let response = credentialed_server(cors)
            .router()
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "https://elsewhere.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }
}
