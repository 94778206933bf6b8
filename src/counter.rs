//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Resource counters
//!
//! A [`ResourceCounter`] reports how many units of a resource kind a tenant
//! currently owns. Two flavours exist:
//!
//! - **count-based**: `count` asks an authoritative store (typically a
//!   `SELECT COUNT(*)`) and `increment`/`decrement` stay no-ops;
//! - **counter-based**: usage is a running total moved by `increment` and
//!   `decrement`, e.g. [`StoredResourceCounter`].
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use quotaron::counter::ResourceCounter;
//! use quotaron::{Resource, StorageError, Tenant};
//!
//! struct RecipeCounter;
//!
//! #[async_trait]
//! impl ResourceCounter for RecipeCounter {
//!     fn supports(&self, _tenant: &Tenant, resource: &Resource) -> bool {
//!         resource.kind().as_str() == "recipe"
//!     }
//!
//!     async fn count(&self, _tenant: &Tenant, _resource: &Resource) -> Result<u64, StorageError> {
//!         // recipe_repository.count_by_owner(tenant).await
//!         Ok(0)
//!     }
//! }
//! ```

use crate::error::StorageError;
use crate::resource::{Resource, ResourceKind};
use crate::storage::{UsageKey, UsageStorage};
use crate::tenant::Tenant;
use ahash::AHashSet as HashSet;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

/// Usage counter for one or more resource kinds
#[async_trait]
pub trait ResourceCounter: Send + Sync {
    /// Whether this counter is responsible for the resource. Must be a pure
    /// classification of the resource designator.
    fn supports(&self, tenant: &Tenant, resource: &Resource) -> bool;

    /// Current usage of the tenant
    async fn count(&self, tenant: &Tenant, resource: &Resource) -> Result<u64, StorageError>;

    /// Records `amount` newly reserved units. No-op for count-based counters.
    async fn increment(
        &self,
        _tenant: &Tenant,
        _resource: &Resource,
        _amount: u64,
    ) -> Result<(), StorageError> {
        Ok(())
    }

    /// Records `amount` released units, clamping usage at zero. No-op for
    /// count-based counters.
    async fn decrement(
        &self,
        _tenant: &Tenant,
        _resource: &Resource,
        _amount: u64,
    ) -> Result<(), StorageError> {
        Ok(())
    }

    /// Human readable name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Counter-based [`ResourceCounter`] over a [`UsageStorage`].
///
/// Serves exactly the kinds it was created with.
pub struct StoredResourceCounter<S: UsageStorage> {
    name: String,
    kinds: HashSet<ResourceKind>,
    storage: Arc<S>,
}

impl<S: UsageStorage> StoredResourceCounter<S> {
    /// # Arguments
    /// - `name`: counter name for logs
    /// - `kinds`: resource kinds this counter serves
    /// - `storage`: shared usage storage
    pub fn new<I, K>(name: impl Into<String>, kinds: I, storage: Arc<S>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ResourceKind>,
    {
        Self {
            name: name.into(),
            kinds: kinds.into_iter().map(Into::into).collect(),
            storage,
        }
    }

    /// Kinds served by this counter
    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.kinds.iter()
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

impl<S: UsageStorage> std::fmt::Debug for StoredResourceCounter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredResourceCounter")
            .field("name", &self.name)
            .field("kinds", &self.kinds)
            .finish()
    }
}

#[async_trait]
impl<S: UsageStorage + 'static> ResourceCounter for StoredResourceCounter<S> {
    fn supports(&self, _tenant: &Tenant, resource: &Resource) -> bool {
        self.kinds.contains(resource.kind())
    }

    async fn count(&self, tenant: &Tenant, resource: &Resource) -> Result<u64, StorageError> {
        self.storage
            .get_usage(&UsageKey::new(tenant, resource.kind()))
            .await
    }

    async fn increment(
        &self,
        tenant: &Tenant,
        resource: &Resource,
        amount: u64,
    ) -> Result<(), StorageError> {
        let used = self
            .storage
            .add_usage(&UsageKey::new(tenant, resource.kind()), amount)
            .await?;
        trace!(counter = %self.name, %tenant, %resource, amount, used, "usage incremented");
        Ok(())
    }

    async fn decrement(
        &self,
        tenant: &Tenant,
        resource: &Resource,
        amount: u64,
    ) -> Result<(), StorageError> {
        let used = self
            .storage
            .sub_usage(&UsageKey::new(tenant, resource.kind()), amount)
            .await?;
        trace!(counter = %self.name, %tenant, %resource, amount, used, "usage decremented");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
