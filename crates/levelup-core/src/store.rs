// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Identity store abstraction.
//!
//! The store is the only mutable state shared across requests. Lookups are
//! the single suspension point of the authentication path.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::StoreResult;
use crate::identity::Identity;

// =============================================================================
// IdentityStore Trait
// =============================================================================

/// Persistence contract for identities, keyed by subject.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Looks up an identity by subject.
    async fn find_by_subject(&self, subject: &str) -> StoreResult<Option<Identity>>;

    /// Returns `true` if an identity with this subject exists.
    async fn exists_by_subject(&self, subject: &str) -> StoreResult<bool> {
        Ok(self.find_by_subject(subject).await?.is_some())
    }

    /// Inserts a new identity.
    ///
    /// Returns `false` without writing when the subject is already taken.
    /// The check and the insert are a single atomic step.
    async fn create(&self, identity: Identity) -> StoreResult<bool>;

    /// Replaces an existing identity.
    ///
    /// Returns `false` without writing when no identity has this subject,
    /// so a concurrent delete is never undone.
    async fn update(&self, identity: Identity) -> StoreResult<bool>;

    /// Inserts or replaces an identity and returns what was stored.
    ///
    /// Unconditional; account operations use [`create`](Self::create) and
    /// [`update`](Self::update) instead.
    async fn save(&self, identity: Identity) -> StoreResult<Identity> {
        if !self.update(identity.clone()).await? {
            self.create(identity.clone()).await?;
        }
        Ok(identity)
    }

    /// Deletes an identity. Returns `true` if one was removed.
    async fn delete_by_subject(&self, subject: &str) -> StoreResult<bool>;

    /// Returns the number of stored identities.
    async fn count(&self) -> StoreResult<usize>;

    /// Returns the store name for identification.
    fn name(&self) -> &str {
        "identity_store"
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Identity store backed by a concurrent hash map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityStore {
    identities: Arc<DashMap<String, Identity>>,
}

impl InMemoryIdentityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with identities.
    pub fn with_identities(identities: impl IntoIterator<Item = Identity>) -> Self {
        let store = Self::new();
        for identity in identities {
            store.identities.insert(identity.subject.clone(), identity);
        }
        store
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_by_subject(&self, subject: &str) -> StoreResult<Option<Identity>> {
        Ok(self.identities.get(subject).map(|e| e.value().clone()))
    }

    async fn exists_by_subject(&self, subject: &str) -> StoreResult<bool> {
        Ok(self.identities.contains_key(subject))
    }

    async fn create(&self, identity: Identity) -> StoreResult<bool> {
        match self.identities.entry(identity.subject.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(identity);
                Ok(true)
            }
        }
    }

    async fn update(&self, identity: Identity) -> StoreResult<bool> {
        match self.identities.get_mut(&identity.subject) {
            Some(mut current) => {
                *current = identity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn save(&self, identity: Identity) -> StoreResult<Identity> {
        self.identities.insert(identity.subject.clone(), identity.clone());
        Ok(identity)
    }

    async fn delete_by_subject(&self, subject: &str) -> StoreResult<bool> {
        Ok(self.identities.remove(subject).is_some())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.identities.len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// Tests
// =============================================================================
