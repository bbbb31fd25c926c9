// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Login and identity lifecycle operations.
//!
//! [`AuthService`] ties the credential validator, the role registry and the
//! token codec together, and owns every write to the identity store. Each
//! operation records an audit entry; audit failures are logged and never
//! fail the operation.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use levelup_core::{AuditLog, AuditLogger, Identity, IdentityStore, NoOpAuditLogger, Role, RoleRegistry, StoreError};
use thiserror::Error;
use tracing::{info, warn};

use super::credentials::CredentialValidator;
use super::jwt::{IssuedToken, JwtManager};
use super::password::{PasswordError, PasswordHasher, PasswordPolicy};
use super::AuthContext;
use crate::error::ApiResult;

// =============================================================================
// AccountError
// =============================================================================

/// Identity lifecycle errors.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The subject is not a usable email address.
    #[error("Invalid subject: {message}")]
    InvalidSubject {
        /// Error message.
        message: String,
    },

    /// Another identity already uses the subject.
    #[error("Subject '{subject}' is already registered")]
    SubjectTaken {
        /// Subject.
        subject: String,
    },

    /// No identity with that subject.
    #[error("No identity found for '{subject}'")]
    NotFound {
        /// Subject.
        subject: String,
    },

    /// The identity was activated before.
    #[error("Account '{subject}' is already activated")]
    AlreadyActivated {
        /// Subject.
        subject: String,
    },

    /// The current password did not match.
    #[error("Current password is incorrect")]
    BadCredentials,

    /// The new password equals the current one.
    #[error("New password must be different from the current password")]
    PasswordUnchanged,

    /// A role assignment with no roles.
    #[error("At least one role is required")]
    NoRoles,

    /// Password policy or hashing failure.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// The identity store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AccountError {
    /// Creates an invalid subject error.
    pub fn invalid_subject(message: impl Into<String>) -> Self {
        Self::InvalidSubject {
            message: message.into(),
        }
    }

    fn not_found(subject: &str) -> Self {
        Self::NotFound {
            subject: subject.to_string(),
        }
    }
}

// =============================================================================
// ActivationToken
// =============================================================================

/// Token delivered to a newly registered identity to activate it.
///
/// The token value is the identity's subject. Anyone who knows an address
/// can activate its pending account; a signed or random token would close
/// that, and only this type needs to change for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationToken(String);

impl ActivationToken {
    /// Returns the activation token for an identity.
    pub fn for_identity(identity: &Identity) -> Self {
        Self(identity.subject.clone())
    }

    /// Wraps a token received from a client.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the subject the token activates.
    pub fn subject(&self) -> &str {
        &self.0
    }

    /// Returns the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActivationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The signed token.
    pub token: IssuedToken,
    /// The authenticated context for the login request itself.
    pub context: AuthContext,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The stored identity, disabled and locked.
    pub identity: Identity,
    /// Token that activates the identity.
    pub activation_token: ActivationToken,
}

// =============================================================================
// AuthService
// =============================================================================

/// Authentication and identity lifecycle service.
#[derive(Clone)]
pub struct AuthService {
    validator: CredentialValidator,
    registry: Arc<RoleRegistry>,
    jwt: Arc<JwtManager>,
    audit: Arc<dyn AuditLogger>,
    policy: PasswordPolicy,
}

impl AuthService {
    /// Creates a service with a no-op audit logger and the default policy.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        hasher: Arc<dyn PasswordHasher>,
        registry: Arc<RoleRegistry>,
        jwt: Arc<JwtManager>,
    ) -> Self {
        Self {
            validator: CredentialValidator::new(store, hasher),
            registry,
            jwt,
            audit: Arc::new(NoOpAuditLogger::new()),
            policy: PasswordPolicy::default(),
        }
    }

    /// Sets the audit logger.
    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Sets the password policy.
    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Validates credentials and issues a token for the identity's roles.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        client_ip: Option<IpAddr>,
    ) -> ApiResult<LoginOutcome> {
        let identity = match self.validator.authenticate(identifier, password).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(subject = %identifier, reason = e.reason(), "Login failed");
                self.record(AuditLog::login_failed(identifier, client_ip, e.reason()))
                    .await;
                return Err(e.into());
            }
        };

        let authorities = self.registry.authorities_for_roles(&identity.roles);
        let token = self
            .jwt
            .issue(&identity.subject, authorities.iter().cloned(), Utc::now())?;

        let context = AuthContext::new(identity.subject.clone(), authorities)
            .with_client_ip(client_ip)
            .with_expires_at(token.expires_at);

        self.record(AuditLog::login(&identity.subject, client_ip)).await;
        info!(subject = %identity.subject, "User logged in");

        Ok(LoginOutcome { token, context })
    }

    /// Records a logout. There is no server-side session to drop.
    pub async fn logout(&self, context: Option<&AuthContext>, client_ip: Option<IpAddr>) {
        let subject = context.map(|c| c.subject.as_str());
        self.record(AuditLog::logout(subject, client_ip)).await;
        info!(subject = subject.unwrap_or("anonymous"), "User logged out");
    }

    // =========================================================================
    // Identity Lifecycle
    // =========================================================================

    /// Registers a new identity, disabled and locked until activated.
    pub async fn register(
        &self,
        subject: &str,
        password: &str,
        client_ip: Option<IpAddr>,
    ) -> ApiResult<Registration> {
        let subject = subject.trim();
        validate_subject(subject)?;

        if self.store().exists_by_subject(subject).await.map_err(AccountError::from)? {
            return Err(AccountError::SubjectTaken {
                subject: subject.to_string(),
            }
            .into());
        }

        self.policy.validate(password).map_err(AccountError::from)?;
        let hash = self.hasher().hash(password).await.map_err(AccountError::from)?;

        // Re-checked atomically: a concurrent registration may have won
        // while the password was hashing.
        let identity = Identity::pending(subject, hash);
        if !self
            .store()
            .create(identity.clone())
            .await
            .map_err(AccountError::from)?
        {
            return Err(AccountError::SubjectTaken {
                subject: subject.to_string(),
            }
            .into());
        }

        self.record(AuditLog::register(subject, client_ip)).await;
        info!(subject = %subject, "Identity registered");

        Ok(Registration {
            activation_token: ActivationToken::for_identity(&identity),
            identity,
        })
    }

    /// Enables and unlocks the identity named by the token.
    pub async fn activate(
        &self,
        token: &ActivationToken,
        client_ip: Option<IpAddr>,
    ) -> ApiResult<Identity> {
        let mut identity = self.require(token.subject()).await?;

        if identity.enabled {
            return Err(AccountError::AlreadyActivated {
                subject: identity.subject,
            }
            .into());
        }

        identity.activate();
        self.replace(identity.clone()).await?;

        self.record(AuditLog::activate(&identity.subject, client_ip)).await;
        info!(subject = %identity.subject, "Identity activated");

        Ok(identity)
    }

    /// Changes the caller's password after checking the current one.
    pub async fn change_password(
        &self,
        context: &AuthContext,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        let mut identity = self.require(&context.subject).await?;

        if !self
            .hasher()
            .verify(current_password, &identity.password_hash)
            .await
            .map_err(AccountError::from)?
        {
            return Err(AccountError::BadCredentials.into());
        }
        if current_password == new_password {
            return Err(AccountError::PasswordUnchanged.into());
        }

        self.policy.validate(new_password).map_err(AccountError::from)?;
        let hash = self
            .hasher()
            .hash(new_password)
            .await
            .map_err(AccountError::from)?;

        identity.set_password_hash(hash);
        self.replace(identity).await?;

        self.record(AuditLog::password_change(&context.subject, context.client_ip))
            .await;
        info!(subject = %context.subject, "Password changed");

        Ok(())
    }

    /// Replaces an identity's roles.
    ///
    /// Tokens issued before the change keep their authorities until they
    /// expire.
    pub async fn assign_roles(
        &self,
        actor: &AuthContext,
        subject: &str,
        roles: Vec<Role>,
    ) -> ApiResult<Identity> {
        if roles.is_empty() {
            return Err(AccountError::NoRoles.into());
        }

        let mut identity = self.require(subject).await?;
        let old_roles = identity.roles.clone();
        identity.set_roles(roles);
        self.replace(identity.clone()).await?;

        self.record(AuditLog::role_change(
            subject,
            &old_roles,
            &identity.roles,
            &actor.subject,
            actor.client_ip,
        ))
        .await;
        info!(subject = %subject, actor = %actor.subject, roles = ?identity.roles, "Roles changed");

        Ok(identity)
    }

    /// Deletes an identity.
    pub async fn remove(&self, actor: &AuthContext, subject: &str) -> ApiResult<()> {
        if !self
            .store()
            .delete_by_subject(subject)
            .await
            .map_err(AccountError::from)?
        {
            return Err(AccountError::not_found(subject).into());
        }

        self.record(AuditLog::account_removed(subject, &actor.subject, actor.client_ip))
            .await;
        info!(subject = %subject, actor = %actor.subject, "Identity removed");

        Ok(())
    }

    /// Looks up an identity.
    pub async fn find(&self, subject: &str) -> ApiResult<Identity> {
        Ok(self.require(subject).await?)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the role registry.
    pub fn registry(&self) -> &Arc<RoleRegistry> {
        &self.registry
    }

    /// Returns the JWT manager.
    pub fn jwt(&self) -> &Arc<JwtManager> {
        &self.jwt
    }

    /// Returns the identity store.
    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        self.validator.store()
    }

    /// Returns the password hasher.
    pub fn hasher(&self) -> &Arc<dyn PasswordHasher> {
        self.validator.hasher()
    }

    /// Returns the audit logger.
    pub fn audit(&self) -> &Arc<dyn AuditLogger> {
        &self.audit
    }

    /// Returns the password policy.
    pub fn password_policy(&self) -> PasswordPolicy {
        self.policy
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn require(&self, subject: &str) -> Result<Identity, AccountError> {
        self.store()
            .find_by_subject(subject)
            .await?
            .ok_or_else(|| AccountError::not_found(subject))
    }

    /// Writes back an identity read by [`require`](Self::require). Fails
    /// with `NotFound` if it was removed in between.
    async fn replace(&self, identity: Identity) -> Result<(), AccountError> {
        let subject = identity.subject.clone();
        if self.store().update(identity).await? {
            Ok(())
        } else {
            Err(AccountError::not_found(&subject))
        }
    }

    async fn record(&self, entry: AuditLog) {
        let action = entry.action;
        if let Err(e) = self.audit.log(entry).await {
            warn!(error = %e, action = %action, "Failed to write audit entry");
        }
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("validator", &self.validator)
            .field("jwt", &self.jwt)
            .field("audit", &self.audit.name())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Minimal shape check for an email subject.
fn validate_subject(subject: &str) -> Result<(), AccountError> {
    if subject.is_empty() {
        return Err(AccountError::invalid_subject("email is required"));
    }
    if subject.chars().any(char::is_whitespace) {
        return Err(AccountError::invalid_subject("email must not contain whitespace"));
    }
    match subject.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(()),
        _ => Err(AccountError::invalid_subject("email is not valid")),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BcryptHasher, JwtConfig};
    use crate::error::ApiError;
    use async_trait::async_trait;
    use levelup_core::{AuditAction, InMemoryAuditLogger, InMemoryIdentityStore, StoreResult};

    const SECRET: &str = "bGV2ZWx1cC10ZXN0LXNlY3JldC1rZXktdGhhdC1pcy1sb25nLWVub3VnaA==";

    struct Fixture {
        service: AuthService,
        store: Arc<InMemoryIdentityStore>,
        audit: Arc<InMemoryAuditLogger>,
    }

    fn fixture(identities: Vec<Identity>) -> Fixture {
        let store = Arc::new(InMemoryIdentityStore::with_identities(identities));
        let audit = Arc::new(InMemoryAuditLogger::new());
        let service = AuthService::new(
            store.clone(),
            Arc::new(BcryptHasher::new(4)),
            Arc::new(RoleRegistry::new()),
            Arc::new(JwtManager::new(JwtConfig::new(SECRET)).unwrap()),
        )
        .with_audit_logger(audit.clone());

        Fixture {
            service,
            store,
            audit,
        }
    }

    fn user(subject: &str, password: &str, roles: Vec<Role>) -> Identity {
        Identity::active(subject, bcrypt::hash(password, 4).unwrap(), roles)
    }

    fn admin_ctx() -> AuthContext {
        AuthContext::new(
            "admin@admin.com",
            RoleRegistry::new().authorities_for(Role::Admin),
        )
    }

    #[tokio::test]
    async fn test_login_issues_role_authorities() {
        let f = fixture(vec![user("user@user.com", "user12345", vec![Role::User])]);

        let outcome = f.service.login("user@user.com", "user12345", None).await.unwrap();

        let decoded = f.service.jwt().decode(&outcome.token.token).unwrap();
        assert_eq!(decoded.subject, "user@user.com");
        assert_eq!(decoded.authorities, RoleRegistry::new().authorities_for(Role::User));
        assert_eq!(outcome.context.subject, "user@user.com");
        assert!(outcome.context.has_authority("game:read"));
        assert_eq!(f.audit.entries_for_action(AuditAction::Login).len(), 1);
    }

    #[tokio::test]
    async fn test_login_default_user_password() {
        let f = fixture(vec![user("user@user.com", "password", vec![Role::User])]);

        let outcome = f.service.login("user@user.com", "password", None).await.unwrap();

        let decoded = f.service.jwt().decode(&outcome.token.token).unwrap();
        assert_eq!(decoded.subject, "user@user.com");
        for authority in ["USER", "user:read", "game:read", "genre:read", "developer:read"] {
            assert!(decoded.has_authority(authority), "missing {}", authority);
        }
        assert!(!decoded.has_authority("ADMIN"));
        assert!(!decoded.has_authority("game:write"));
    }

    #[tokio::test]
    async fn test_login_failure_is_audited() {
        let f = fixture(vec![user("user@user.com", "user12345", vec![Role::User])]);

        let err = f.service.login("user@user.com", "bad-password", None).await.unwrap_err();
        assert_eq!(err.error_code(), "BAD_CREDENTIALS");

        let failed = f.audit.entries_for_action(AuditAction::LoginFailed);
        assert_eq!(failed.len(), 1);
        assert!(failed[0].actor.is_none());
    }

    #[tokio::test]
    async fn test_register_creates_pending_identity() {
        let f = fixture(vec![]);

        let reg = f.service.register("new@user.com", "password1", None).await.unwrap();
        assert!(!reg.identity.enabled);
        assert!(reg.identity.locked);
        assert_eq!(reg.identity.roles, vec![Role::User]);
        assert_eq!(reg.activation_token.subject(), "new@user.com");

        let stored = f.store.find_by_subject("new@user.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "password1");
    }

    #[tokio::test]
    async fn test_register_rejects_taken_subject() {
        let f = fixture(vec![user("user@user.com", "user12345", vec![Role::User])]);

        let err = f.service.register("user@user.com", "password1", None).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Account(AccountError::SubjectTaken { .. })
        ));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_keeps_winner_password() {
        let f = fixture(vec![]);
        let service = Arc::new(f.service);

        let tasks: Vec<_> = ["password-a", "password-b"]
            .into_iter()
            .map(|password| {
                let service = service.clone();
                tokio::spawn(async move {
                    let result = service.register("dup@user.com", password, None).await;
                    (password, result)
                })
            })
            .collect();

        let mut winners = Vec::new();
        for task in tasks {
            match task.await.unwrap() {
                (password, Ok(_)) => winners.push(password),
                (_, Err(err)) => assert!(matches!(
                    err,
                    ApiError::Account(AccountError::SubjectTaken { .. })
                )),
            }
        }
        assert_eq!(winners.len(), 1);

        let stored = f.store.find_by_subject("dup@user.com").await.unwrap().unwrap();
        assert!(bcrypt::verify(winners[0], &stored.password_hash).unwrap());
        assert_eq!(f.audit.entries_for_action(AuditAction::Register).len(), 1);
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let f = fixture(vec![]);

        let err = f.service.register("not-an-email", "password1", None).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err = f.service.register("a@b.com", "short", None).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(f.store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_activate_then_login() {
        let f = fixture(vec![]);
        let reg = f.service.register("new@user.com", "password1", None).await.unwrap();

        let err = f.service.login("new@user.com", "password1", None).await.unwrap_err();
        assert_eq!(err.error_code(), "ACCOUNT_DISABLED");

        let identity = f.service.activate(&reg.activation_token, None).await.unwrap();
        assert!(identity.is_active());

        assert!(f.service.login("new@user.com", "password1", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_double_activation() {
        let f = fixture(vec![]);
        let reg = f.service.register("new@user.com", "password1", None).await.unwrap();

        f.service.activate(&reg.activation_token, None).await.unwrap();
        let err = f.service.activate(&reg.activation_token, None).await.unwrap_err();

        assert!(matches!(
            err,
            ApiError::Account(AccountError::AlreadyActivated { .. })
        ));
    }

    #[tokio::test]
    async fn test_activate_unknown_token() {
        let f = fixture(vec![]);
        let err = f
            .service
            .activate(&ActivationToken::from_raw("ghost@x.com"), None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_change_password() {
        let f = fixture(vec![user("user@user.com", "user12345", vec![Role::User])]);
        let ctx = AuthContext::new("user@user.com", Default::default());

        let err = f
            .service
            .change_password(&ctx, "wrong-password", "newpassword1")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Account(AccountError::BadCredentials)));

        let err = f
            .service
            .change_password(&ctx, "user12345", "user12345")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Account(AccountError::PasswordUnchanged)));

        f.service
            .change_password(&ctx, "user12345", "newpassword1")
            .await
            .unwrap();

        assert!(f.service.login("user@user.com", "user12345", None).await.is_err());
        assert!(f.service.login("user@user.com", "newpassword1", None).await.is_ok());
        assert_eq!(f.audit.entries_for_action(AuditAction::PasswordChange).len(), 1);
    }

    #[tokio::test]
    async fn test_assign_roles_affects_next_login_only() {
        let f = fixture(vec![user("user@user.com", "user12345", vec![Role::User])]);

        let before = f.service.login("user@user.com", "user12345", None).await.unwrap();
        f.service
            .assign_roles(&admin_ctx(), "user@user.com", vec![Role::User, Role::Admin])
            .await
            .unwrap();

        let old = f.service.jwt().decode(&before.token.token).unwrap();
        assert!(!old.has_authority("ADMIN"));

        let after = f.service.login("user@user.com", "user12345", None).await.unwrap();
        assert!(after.context.is_admin());
        assert_eq!(f.audit.entries_for_action(AuditAction::RoleChange).len(), 1);
    }

    #[tokio::test]
    async fn test_assign_empty_roles_rejected() {
        let f = fixture(vec![user("user@user.com", "user12345", vec![Role::User])]);
        let err = f
            .service
            .assign_roles(&admin_ctx(), "user@user.com", vec![])
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_remove() {
        let f = fixture(vec![user("user@user.com", "user12345", vec![Role::User])]);

        f.service.remove(&admin_ctx(), "user@user.com").await.unwrap();
        assert!(f.service.find("user@user.com").await.is_err());

        let err = f.service.remove(&admin_ctx(), "user@user.com").await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
        assert_eq!(f.audit.entries_for_action(AuditAction::AccountRemoved).len(), 1);
    }

    /// Removes each identity right after handing it out, as a concurrent
    /// admin delete would.
    struct VanishingStore(InMemoryIdentityStore);

    #[async_trait]
    impl IdentityStore for VanishingStore {
        async fn find_by_subject(&self, subject: &str) -> StoreResult<Option<Identity>> {
            let found = self.0.find_by_subject(subject).await?;
            self.0.delete_by_subject(subject).await?;
            Ok(found)
        }
        async fn create(&self, identity: Identity) -> StoreResult<bool> {
            self.0.create(identity).await
        }
        async fn update(&self, identity: Identity) -> StoreResult<bool> {
            self.0.update(identity).await
        }
        async fn delete_by_subject(&self, subject: &str) -> StoreResult<bool> {
            self.0.delete_by_subject(subject).await
        }
        async fn count(&self) -> StoreResult<usize> {
            self.0.count().await
        }
    }

    #[tokio::test]
    async fn test_removed_identity_is_not_restored() {
        let store = Arc::new(VanishingStore(InMemoryIdentityStore::with_identities([
            Identity::pending("gone@user.com", bcrypt::hash("password1", 4).unwrap()),
            user("user@user.com", "user12345", vec![Role::User]),
        ])));
        let service = AuthService::new(
            store.clone(),
            Arc::new(BcryptHasher::new(4)),
            Arc::new(RoleRegistry::new()),
            Arc::new(JwtManager::new(JwtConfig::new(SECRET)).unwrap()),
        );

        let err = service
            .activate(&ActivationToken::from_raw("gone@user.com"), None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);

        let err = service
            .assign_roles(&admin_ctx(), "user@user.com", vec![Role::Admin])
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);

        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_logout_is_audited() {
        let f = fixture(vec![]);
        f.service.logout(None, None).await;
        f.service.logout(Some(&admin_ctx()), None).await;

        let entries = f.audit.entries_for_action(AuditAction::Logout);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].actor.is_none());
        assert_eq!(entries[1].actor.as_deref(), Some("admin@admin.com"));
    }

    #[test]
    fn test_validate_subject() {
        assert!(validate_subject("user@user.com").is_ok());
        assert!(validate_subject("").is_err());
        assert!(validate_subject("user").is_err());
        assert!(validate_subject("@user.com").is_err());
        assert!(validate_subject("user@").is_err());
        assert!(validate_subject("a b@c.com").is_err());
        assert!(validate_subject("a@b@c.com").is_err());
    }
}
