// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity administration handlers.
//!
//! Access to these routes is decided by the route policy; the handlers
//! assume an admin caller.

use axum::{extract::State, http::StatusCode, Json};
use levelup_core::Role;
use serde::Deserialize;

use crate::error::{ApiResult, ValidationErrors};
use crate::extractors::{Auth, SubjectPath, ValidatedJson};
use crate::response::IdentityResponse;
use crate::state::AppState;

/// GET /api/v1/admin/users/{subject}
pub async fn get_user(
    State(state): State<AppState>,
    SubjectPath(subject): SubjectPath,
) -> ApiResult<Json<IdentityResponse>> {
    let identity = state.auth().find(&subject).await?;
    Ok(Json(identity.into()))
}

/// Role assignment request body.
#[derive(Debug, Deserialize)]
pub struct AssignRolesRequest {
    /// Role names, e.g. `["USER", "ADMIN"]`.
    pub roles: Vec<String>,
}

impl AssignRolesRequest {
    fn parse_roles(&self) -> ApiResult<Vec<Role>> {
        let mut errors = ValidationErrors::new();
        let mut roles = Vec::with_capacity(self.roles.len());

        for name in &self.roles {
            match Role::parse(name) {
                Some(role) => roles.push(role),
                None => errors.add("roles", format!("Unknown role '{}'", name)),
            }
        }

        errors.into_result(roles)
    }
}

/// PUT /api/v1/admin/users/{subject}/roles
///
/// Replaces the identity's roles. Takes effect at its next login.
pub async fn assign_roles(
    State(state): State<AppState>,
    Auth(auth_ctx): Auth,
    SubjectPath(subject): SubjectPath,
    ValidatedJson(request): ValidatedJson<AssignRolesRequest>,
) -> ApiResult<Json<IdentityResponse>> {
    let roles = request.parse_roles()?;
    let identity = state.auth().assign_roles(&auth_ctx, &subject, roles).await?;
    Ok(Json(identity.into()))
}

/// DELETE /api/v1/admin/users/{subject}
pub async fn remove_user(
    State(state): State<AppState>,
    Auth(auth_ctx): Auth,
    SubjectPath(subject): SubjectPath,
) -> ApiResult<StatusCode> {
    state.auth().remove(&auth_ctx, &subject).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Tests
// =============================================================================
