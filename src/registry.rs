//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Resource counter registry
//!
//! Dispatches a (tenant, resource) pair to the counter responsible for it.
//! Counters are registered explicitly and in order; the first counter whose
//! `supports` matches wins, so registration order is part of the
//! configuration.
//!
//! # Example
//!
//! ```rust
//! use quotaron::counter::StoredResourceCounter;
//! use quotaron::registry::DefaultResourceCounterRegistry;
//! use quotaron::storage::MemoryStorage;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let registry = DefaultResourceCounterRegistry::builder()
//!     .register(StoredResourceCounter::new("recipes", ["recipe"], storage.clone()))
//!     .register(StoredResourceCounter::new("books", ["recipe_book"], storage))
//!     .build();
//! assert_eq!(registry.len(), 2);
//! ```

use crate::counter::ResourceCounter;
use crate::error::QuotaError;
use crate::resource::Resource;
use crate::tenant::Tenant;
use std::sync::Arc;
use tracing::error;

/// Finds the counter for a resource
pub trait ResourceCounterRegistry: Send + Sync {
    /// # Returns
    /// - `Ok(counter)`: the first counter supporting the resource
    /// - `Err(QuotaError::CounterNotFound)`: no counter supports it
    fn get_resource_counter(
        &self,
        tenant: &Tenant,
        resource: &Resource,
    ) -> Result<Arc<dyn ResourceCounter>, QuotaError>;
}

/// Ordered list of counters, first match wins.
#[derive(Clone, Default)]
pub struct DefaultResourceCounterRegistry {
    counters: Vec<Arc<dyn ResourceCounter>>,
}

impl std::fmt::Debug for DefaultResourceCounterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultResourceCounterRegistry")
            .field("counters", &self.counter_names())
            .finish()
    }
}

impl DefaultResourceCounterRegistry {
    pub fn new(counters: Vec<Arc<dyn ResourceCounter>>) -> Self {
        Self { counters }
    }

    pub fn builder() -> ResourceCounterRegistryBuilder {
        ResourceCounterRegistryBuilder::new()
    }

    /// Registered counters in match order
    pub fn counters(&self) -> &[Arc<dyn ResourceCounter>] {
        &self.counters
    }

    pub fn counter_names(&self) -> Vec<&str> {
        self.counters.iter().map(|c| c.name()).collect()
    }

    /// Every counter supporting the resource, in match order. More than one
    /// entry means an ambiguous registration.
    pub fn matching_counters(
        &self,
        tenant: &Tenant,
        resource: &Resource,
    ) -> Vec<Arc<dyn ResourceCounter>> {
        self.counters
            .iter()
            .filter(|c| c.supports(tenant, resource))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

impl ResourceCounterRegistry for DefaultResourceCounterRegistry {
    fn get_resource_counter(
        &self,
        tenant: &Tenant,
        resource: &Resource,
    ) -> Result<Arc<dyn ResourceCounter>, QuotaError> {
        self.counters
            .iter()
            .find(|c| c.supports(tenant, resource))
            .cloned()
            .ok_or_else(|| {
                error!(%tenant, kind = %resource.kind(), "no resource counter registered");
                QuotaError::CounterNotFound(resource.kind().to_string())
            })
    }
}

/// Builder registering counters in match order
#[derive(Default)]
pub struct ResourceCounterRegistryBuilder {
    counters: Vec<Arc<dyn ResourceCounter>>,
}

impl ResourceCounterRegistryBuilder {
    pub fn new() -> Self {
        Self {
            counters: Vec::new(),
        }
    }

    /// Adds a counter
    pub fn register<C: ResourceCounter + 'static>(mut self, counter: C) -> Self {
        self.counters.push(Arc::new(counter));
        self
    }

    /// Registers an already shared counter
    pub fn register_arc(mut self, counter: Arc<dyn ResourceCounter>) -> Self {
        self.counters.push(counter);
        self
    }

    pub fn build(self) -> DefaultResourceCounterRegistry {
        DefaultResourceCounterRegistry::new(self.counters)
    }
}
