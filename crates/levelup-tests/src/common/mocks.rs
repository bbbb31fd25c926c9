// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Doubles
//!
//! - [`UnavailableStore`]: every operation fails as if the backend were down
//! - [`PlainTextHasher`]: instant hashing that counts its calls

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use levelup_api::auth::{PasswordHasher, PasswordResult};
use levelup_core::{Identity, IdentityStore, StoreError, StoreResult};

// =============================================================================
// UnavailableStore
// =============================================================================

/// Identity store whose backend is always unreachable.
#[derive(Debug, Default)]
pub struct UnavailableStore;

#[async_trait]
impl IdentityStore for UnavailableStore {
    async fn find_by_subject(&self, _subject: &str) -> StoreResult<Option<Identity>> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn create(&self, _identity: Identity) -> StoreResult<bool> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn update(&self, _identity: Identity) -> StoreResult<bool> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn delete_by_subject(&self, _subject: &str) -> StoreResult<bool> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn count(&self) -> StoreResult<usize> {
        Err(StoreError::unavailable("connection refused"))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

// =============================================================================
// PlainTextHasher
// =============================================================================

/// Stores passwords as `plain$<password>`. Never use outside tests.
#[derive(Debug, Default)]
pub struct PlainTextHasher {
    hashes: AtomicUsize,
    verifications: AtomicUsize,
}

impl PlainTextHasher {
    /// Creates a hasher with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `hash` calls so far.
    pub fn hash_count(&self) -> usize {
        self.hashes.load(Ordering::SeqCst)
    }

    /// Number of `verify` calls so far.
    pub fn verify_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    /// The stored form of a password.
    pub fn encode(password: &str) -> String {
        format!("plain${}", password)
    }
}

#[async_trait]
impl PasswordHasher for PlainTextHasher {
    async fn hash(&self, password: &str) -> PasswordResult<String> {
        self.hashes.fetch_add(1, Ordering::SeqCst);
        Ok(Self::encode(password))
    }

    async fn verify(&self, password: &str, hash: &str) -> PasswordResult<bool> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        Ok(hash == Self::encode(password))
    }

    fn name(&self) -> &str {
        "plain_text"
    }
}
