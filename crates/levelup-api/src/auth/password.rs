// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Password hashing and password policy.

use async_trait::async_trait;
use thiserror::Error;

/// Minimum password length in bytes.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in bytes (bcrypt limit).
pub const MAX_PASSWORD_LENGTH: usize = 72;

// =============================================================================
// PasswordError
// =============================================================================

/// Password hashing and policy errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// Shorter than the policy minimum.
    #[error("Password must be at least {min} characters")]
    TooShort {
        /// Minimum length.
        min: usize,
    },

    /// Longer than the policy maximum.
    #[error("Password must be at most {max} characters")]
    TooLong {
        /// Maximum length.
        max: usize,
    },

    /// The hashing backend failed.
    #[error("Password hashing failed: {message}")]
    Hashing {
        /// Error message.
        message: String,
    },
}

impl PasswordError {
    /// Creates a hashing error.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    /// Returns `true` for policy violations, as opposed to backend failures.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, PasswordError::TooShort { .. } | PasswordError::TooLong { .. })
    }
}

/// Result type for password operations.
pub type PasswordResult<T> = Result<T, PasswordError>;

// =============================================================================
// PasswordPolicy
// =============================================================================

/// Length rules applied to new passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in bytes.
    pub min_length: usize,
    /// Maximum length in bytes.
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            max_length: MAX_PASSWORD_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// Checks a candidate password against the policy.
    pub fn validate(&self, password: &str) -> PasswordResult<()> {
        if password.len() < self.min_length {
            return Err(PasswordError::TooShort {
                min: self.min_length,
            });
        }
        if password.len() > self.max_length {
            return Err(PasswordError::TooLong {
                max: self.max_length,
            });
        }
        Ok(())
    }
}

// =============================================================================
// PasswordHasher Trait
// =============================================================================

/// One-way password hashing.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plain text password.
    async fn hash(&self, password: &str) -> PasswordResult<String>;

    /// Checks a plain text password against a stored hash.
    async fn verify(&self, password: &str, hash: &str) -> PasswordResult<bool>;

    /// Returns the hasher name for identification.
    fn name(&self) -> &str {
        "password_hasher"
    }
}

// =============================================================================
// BcryptHasher
// =============================================================================

/// bcrypt hasher. Work runs on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Creates a hasher with the given cost factor.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Returns the cost factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

#[async_trait]
impl PasswordHasher for BcryptHasher {
    async fn hash(&self, password: &str) -> PasswordResult<String> {
        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || {
            bcrypt::hash(password, cost).map_err(|e| PasswordError::hashing(e.to_string()))
        })
        .await
        .map_err(|e| PasswordError::hashing(format!("Task join error: {}", e)))?
    }

    async fn verify(&self, password: &str, hash: &str) -> PasswordResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || {
            bcrypt::verify(password, &hash).map_err(|e| PasswordError::hashing(e.to_string()))
        })
        .await
        .map_err(|e| PasswordError::hashing(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "bcrypt"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = BcryptHasher::new(4);
        let hash = hasher.hash("user12345").await.unwrap();
        assert!(hash.starts_with("$2b$04$"));

        assert!(hasher.verify("user12345", &hash).await.unwrap());
        assert!(!hasher.verify("wrong-password", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejects_invalid_hash() {
        let hasher = BcryptHasher::new(4);
        assert!(matches!(
            hasher.verify("whatever", "not-a-bcrypt-hash").await,
            Err(PasswordError::Hashing { .. })
        ));
    }

    #[test]
    fn test_policy_bounds() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.validate("short"), Err(PasswordError::TooShort { min: 8 }));
        assert!(policy.validate("exactly8").is_ok());
        assert!(policy.validate(&"x".repeat(72)).is_ok());
        assert_eq!(
            policy.validate(&"x".repeat(73)),
            Err(PasswordError::TooLong { max: 72 })
        );
    }

    #[test]
    fn test_policy_violation_kind() {
        assert!(PasswordError::TooShort { min: 8 }.is_policy_violation());
        assert!(!PasswordError::hashing("boom").is_policy_violation());
    }
}
