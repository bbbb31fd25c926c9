// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use levelup_core::{AuditLogger, IdentityStore, InMemoryIdentityStore, NoOpAuditLogger, RoleRegistry};

use crate::auth::{AuthService, BcryptHasher, JwtManager, PasswordHasher};
use crate::config::ApiConfig;
use crate::policy::RoutePolicy;

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Everything in it is read-only after startup except the identity store
/// behind the auth service.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Login and identity lifecycle service.
    pub auth_service: Arc<AuthService>,
    /// Route access policy.
    pub route_policy: Arc<RoutePolicy>,
    /// Audit logger.
    pub audit_logger: Arc<dyn AuditLogger>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the auth service.
    pub fn auth(&self) -> &AuthService {
        &self.auth_service
    }

    /// Returns the JWT manager.
    pub fn jwt(&self) -> &Arc<JwtManager> {
        self.auth_service.jwt()
    }

    /// Returns the identity store.
    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        self.auth_service.store()
    }

    /// Returns the route policy.
    pub fn policy(&self) -> &Arc<RoutePolicy> {
        &self.route_policy
    }

    /// Returns the audit logger.
    pub fn audit(&self) -> &Arc<dyn AuditLogger> {
        &self.audit_logger
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("auth_service", &self.auth_service)
            .field("rules", &self.route_policy.rules().len())
            .field("audit_logger", &self.audit_logger.name())
            .finish()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    jwt_manager: Option<Arc<JwtManager>>,
    identity_store: Option<Arc<dyn IdentityStore>>,
    password_hasher: Option<Arc<dyn PasswordHasher>>,
    role_registry: Option<Arc<RoleRegistry>>,
    route_policy: Option<Arc<RoutePolicy>>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the JWT manager. Defaults to one built from the configuration.
    pub fn jwt_manager(mut self, manager: Arc<JwtManager>) -> Self {
        self.jwt_manager = Some(manager);
        self
    }

    /// Sets the identity store. Defaults to an empty in-memory store.
    pub fn identity_store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.identity_store = Some(store);
        self
    }

    /// Sets the password hasher. Defaults to bcrypt at the default cost.
    pub fn password_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.password_hasher = Some(hasher);
        self
    }

    /// Sets the role registry.
    pub fn role_registry(mut self, registry: Arc<RoleRegistry>) -> Self {
        self.role_registry = Some(registry);
        self
    }

    /// Sets the route policy. Defaults to [`RoutePolicy::catalog`].
    pub fn route_policy(mut self, policy: Arc<RoutePolicy>) -> Self {
        self.route_policy = Some(policy);
        self
    }

    /// Sets the audit logger.
    pub fn audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(logger);
        self
    }

    /// Builds the AppState.
    ///
    /// Fails if no JWT manager was given and the configured JWT settings
    /// are invalid.
    pub fn build(self) -> crate::error::ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let jwt_manager = match self.jwt_manager {
            Some(manager) => manager,
            None => Arc::new(JwtManager::new(config.jwt.clone())?),
        };

        let audit_logger = self
            .audit_logger
            .unwrap_or_else(|| Arc::new(NoOpAuditLogger::new()));

        let auth_service = AuthService::new(
            self.identity_store
                .unwrap_or_else(|| Arc::new(InMemoryIdentityStore::new())),
            self.password_hasher
                .unwrap_or_else(|| Arc::new(BcryptHasher::default())),
            self.role_registry
                .unwrap_or_else(|| Arc::new(RoleRegistry::new())),
            jwt_manager,
        )
        .with_audit_logger(audit_logger.clone())
        .with_password_policy(config.password);

        Ok(AppState {
            config: Arc::new(config),
            auth_service: Arc::new(auth_service),
            route_policy: self
                .route_policy
                .unwrap_or_else(|| Arc::new(RoutePolicy::catalog())),
            audit_logger,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;

    const SECRET: &str = "bGV2ZWx1cC10ZXN0LXNlY3JldC1rZXktdGhhdC1pcy1sb25nLWVub3VnaA==";

    fn test_config() -> ApiConfig {
        ApiConfig::default().with_jwt(JwtConfig::new(SECRET))
    }

    #[test]
    fn test_app_state_builder_defaults() {
        let state = AppState::builder().config(test_config()).build().unwrap();

        assert_eq!(state.store().name(), InMemoryIdentityStore::new().name());
        assert!(!state.policy().rules().is_empty());
        assert_eq!(state.jwt().expiration_secs(), JwtConfig::TWO_WEEKS);
    }

    #[test]
    fn test_app_state_requires_secret() {
        assert!(AppState::builder().build().is_err());
    }

    #[test]
    fn test_app_state_with_components() {
        let policy = Arc::new(RoutePolicy::new());
        let state = AppState::builder()
            .config(test_config())
            .route_policy(policy.clone())
            .password_hasher(Arc::new(BcryptHasher::new(4)))
            .build()
            .unwrap();

        assert!(state.policy().rules().is_empty());
        assert_eq!(state.auth().hasher().name(), "bcrypt");
    }
}
