// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::auth::ActivationToken;
use crate::error::{ApiResult, ValidationErrors};
use crate::extractors::{Auth, ClientIp, OptionalAuth, ValidatedJson};
use crate::response::{
    CurrentUserResponse, IdentityResponse, LoginResponse, LogoutResponse, MessageResponse,
    RegistrationResponse,
};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email.
    #[serde(alias = "username")]
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Authenticates a user and returns a token in the `Authorization` header,
/// the authorization cookie and the body.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    require_credentials(&request.email, &request.password)?;

    let outcome = state
        .auth()
        .login(request.email.trim(), &request.password, client_ip)
        .await?;

    Ok(LoginResponse::new(outcome.token, state.config.cookie.clone()))
}

fn require_credentials(email: &str, password: &str) -> ApiResult<()> {
    let mut errors = ValidationErrors::new();
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    }
    if password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result(())
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/v1/auth/logout
///
/// Clears the authorization cookie. Tokens stay valid until they expire.
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(auth_ctx): OptionalAuth,
    ClientIp(client_ip): ClientIp,
) -> impl IntoResponse {
    state.auth().logout(auth_ctx.as_ref(), client_ip).await;
    LogoutResponse::new(state.config.cookie.clone())
}

// =============================================================================
// Registration
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Email, which becomes the subject.
    pub email: String,
    /// Password.
    pub password: String,
}

/// POST /api/v1/auth/register
///
/// Registers a disabled, locked identity and returns its activation token.
pub async fn register(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    require_credentials(&request.email, &request.password)?;

    let registration = state
        .auth()
        .register(&request.email, &request.password, client_ip)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            activation_token: registration.activation_token.to_string(),
            identity: registration.identity.into(),
        }),
    ))
}

/// GET /api/v1/auth/activate/{token}
pub async fn activate(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Path(token): Path<String>,
) -> ApiResult<Json<IdentityResponse>> {
    let identity = state
        .auth()
        .activate(&ActivationToken::from_raw(token), client_ip)
        .await?;

    Ok(Json(identity.into()))
}

// =============================================================================
// Current User
// =============================================================================

/// GET /api/v1/auth/me
///
/// Returns the subject and authorities of the bound token.
pub async fn current_user(Auth(auth_ctx): Auth) -> Json<CurrentUserResponse> {
    Json(auth_ctx.into())
}

// =============================================================================
// Change Password
// =============================================================================

/// Change password request body.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

/// POST /api/v1/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Auth(auth_ctx): Auth,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .auth()
        .change_password(&auth_ctx, &request.current_password, &request.new_password)
        .await?;

    Ok(Json(MessageResponse::ok("Password changed successfully")))
}

// =============================================================================
// Tests
// =============================================================================
