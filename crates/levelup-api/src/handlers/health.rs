// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::response::HealthResponse;
use crate::state::AppState;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Simple liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

// =============================================================================
// Readiness Check
// =============================================================================

/// Readiness check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready.
    pub ready: bool,
    /// Component statuses.
    pub components: Vec<ComponentStatus>,
}

/// Status of a system component.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /ready
///
/// Readiness check that verifies the identity store answers.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store();
    let store_status = match store.count().await {
        Ok(count) => ComponentStatus {
            name: store.name().to_string(),
            healthy: true,
            message: Some(format!("{} identities", count)),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Identity store readiness check failed");
            ComponentStatus {
                name: store.name().to_string(),
                healthy: false,
                message: Some("Identity store unavailable".to_string()),
            }
        }
    };

    let audit_status = ComponentStatus {
        name: state.audit().name().to_string(),
        healthy: true,
        message: None,
    };

    let ready = store_status.healthy;
    let response = ReadinessResponse {
        ready,
        components: vec![store_status, audit_status],
    };

    if ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use crate::config::ApiConfig;

    fn test_state() -> AppState {
        let config = ApiConfig::default().with_jwt(JwtConfig::new(
            "bGV2ZWx1cC10ZXN0LXNlY3JldC1rZXktdGhhdC1pcy1sb25nLWVub3VnaA==",
        ));
        AppState::builder().config(config).build().unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_endpoint() {
        let response = ready(State(test_state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
