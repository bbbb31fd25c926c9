// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential validation against the identity store.

use std::sync::Arc;

use levelup_core::{Identity, IdentityStore, StoreError};
use thiserror::Error;
use tracing::{debug, instrument};

use super::password::{PasswordError, PasswordHasher};

// =============================================================================
// CredentialError
// =============================================================================

/// Reasons a login attempt is refused.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No identity with that subject.
    #[error("No identity found for '{subject}'")]
    NotFound {
        /// The identifier that was looked up.
        subject: String,
    },

    /// The identity exists but has not been enabled.
    #[error("Account '{subject}' is disabled")]
    AccountDisabled {
        /// Subject.
        subject: String,
    },

    /// The identity exists but is locked.
    #[error("Account '{subject}' is locked")]
    AccountLocked {
        /// Subject.
        subject: String,
    },

    /// The password did not match.
    #[error("Bad credentials")]
    BadCredentials,

    /// The identity store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The hashing backend failed.
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl CredentialError {
    /// Returns a short reason string for audit entries.
    pub fn reason(&self) -> &'static str {
        match self {
            CredentialError::NotFound { .. } => "not_found",
            CredentialError::AccountDisabled { .. } => "account_disabled",
            CredentialError::AccountLocked { .. } => "account_locked",
            CredentialError::BadCredentials => "bad_credentials",
            CredentialError::Store(_) => "store_error",
            CredentialError::Password(_) => "hashing_error",
        }
    }
}

/// Result type for credential validation.
pub type CredentialResult<T> = Result<T, CredentialError>;

// =============================================================================
// CredentialValidator
// =============================================================================

/// Checks an identifier/password pair against the identity store.
///
/// Checks run in a fixed order: existence, enabled, locked, password. A
/// disabled or locked account is reported as such even when the password is
/// wrong.
#[derive(Clone)]
pub struct CredentialValidator {
    store: Arc<dyn IdentityStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl CredentialValidator {
    /// Creates a validator.
    pub fn new(store: Arc<dyn IdentityStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Authenticates a subject with a plain text password.
    #[instrument(skip(self, password), name = "credentials.authenticate")]
    pub async fn authenticate(&self, identifier: &str, password: &str) -> CredentialResult<Identity> {
        let identity = self
            .store
            .find_by_subject(identifier)
            .await?
            .ok_or_else(|| CredentialError::NotFound {
                subject: identifier.to_string(),
            })?;

        if !identity.enabled {
            debug!("Authentication refused: account disabled");
            return Err(CredentialError::AccountDisabled {
                subject: identity.subject,
            });
        }

        if identity.locked {
            debug!("Authentication refused: account locked");
            return Err(CredentialError::AccountLocked {
                subject: identity.subject,
            });
        }

        if !self.hasher.verify(password, &identity.password_hash).await? {
            debug!("Authentication refused: bad credentials");
            return Err(CredentialError::BadCredentials);
        }

        Ok(identity)
    }

    /// Returns the password hasher.
    pub fn hasher(&self) -> &Arc<dyn PasswordHasher> {
        &self.hasher
    }

    /// Returns the identity store.
    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }
}

impl std::fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialValidator")
            .field("store", &self.store.name())
            .field("hasher", &self.hasher.name())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::BcryptHasher;
    use async_trait::async_trait;
    use levelup_core::{InMemoryIdentityStore, Role, StoreResult};

    fn validator_with(identities: Vec<Identity>) -> CredentialValidator {
        CredentialValidator::new(
            Arc::new(InMemoryIdentityStore::with_identities(identities)),
            Arc::new(BcryptHasher::new(4)),
        )
    }

    fn hash(password: &str) -> String {
        bcrypt::hash(password, 4).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let validator = validator_with(vec![Identity::active(
            "user@user.com",
            hash("user12345"),
            vec![Role::User],
        )]);

        let identity = validator.authenticate("user@user.com", "user12345").await.unwrap();
        assert_eq!(identity.subject, "user@user.com");
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let validator = validator_with(vec![]);
        assert!(matches!(
            validator.authenticate("ghost@x.com", "whatever").await,
            Err(CredentialError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_bad_password() {
        let validator = validator_with(vec![Identity::active(
            "user@user.com",
            hash("user12345"),
            vec![Role::User],
        )]);

        let err = validator.authenticate("user@user.com", "nope").await.unwrap_err();
        assert!(matches!(err, CredentialError::BadCredentials));
        assert_eq!(err.reason(), "bad_credentials");
    }

    #[tokio::test]
    async fn test_disabled_reported_before_bad_password() {
        let validator = validator_with(vec![
            Identity::pending("new@user.com", hash("user12345")).with_locked(false),
        ]);

        assert!(matches!(
            validator.authenticate("new@user.com", "wrong-password").await,
            Err(CredentialError::AccountDisabled { .. })
        ));
    }

    #[tokio::test]
    async fn test_disabled_checked_before_locked() {
        let validator = validator_with(vec![Identity::pending("new@user.com", hash("user12345"))]);

        assert!(matches!(
            validator.authenticate("new@user.com", "user12345").await,
            Err(CredentialError::AccountDisabled { .. })
        ));
    }

    #[tokio::test]
    async fn test_locked_reported_before_bad_password() {
        let validator = validator_with(vec![
            Identity::active("locked@user.com", hash("user12345"), vec![Role::User]).with_locked(true),
        ]);

        assert!(matches!(
            validator.authenticate("locked@user.com", "wrong-password").await,
            Err(CredentialError::AccountLocked { .. })
        ));
    }

    struct FailingStore;

    #[async_trait]
    impl IdentityStore for FailingStore {
        async fn find_by_subject(&self, _subject: &str) -> StoreResult<Option<Identity>> {
            Err(StoreError::unavailable("down"))
        }
        async fn create(&self, _identity: Identity) -> StoreResult<bool> {
            Err(StoreError::unavailable("down"))
        }
        async fn update(&self, _identity: Identity) -> StoreResult<bool> {
            Err(StoreError::unavailable("down"))
        }
        async fn delete_by_subject(&self, _subject: &str) -> StoreResult<bool> {
            Err(StoreError::unavailable("down"))
        }
        async fn count(&self) -> StoreResult<usize> {
            Err(StoreError::unavailable("down"))
        }
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let validator = CredentialValidator::new(Arc::new(FailingStore), Arc::new(BcryptHasher::new(4)));
        assert!(matches!(
            validator.authenticate("user@user.com", "user12345").await,
            Err(CredentialError::Store(StoreError::Unavailable { .. }))
        ));
    }
}
