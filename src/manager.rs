//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Quota manager
//!
//! The decision engine. For a (tenant, resource) pair it resolves the limit,
//! dispatches to the counter that owns the resource, reads usage, and turns
//! `used + amount` against the limit into a [`QuotaResult`]. It holds no
//! state of its own: concurrent callers only share the resolver and the
//! counters, which are responsible for their own consistency.
//!
//! `acquire` is optimistic. Two racing acquires for the same key may both
//! pass the limit check before either increments, so a counter-based quota
//! can transiently overshoot by at most the number of racing callers.
//!
//! # Example
//!
//! ```rust
//! use quotaron::prelude::*;
//! use quotaron::counter::StoredResourceCounter;
//! use quotaron::limit::FnQuotaLimitResolver;
//! use quotaron::storage::MemoryStorage;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuotaError> {
//!     let manager = QuotaManager::builder()
//!         .limit_resolver(FnQuotaLimitResolver::new(|_: &Tenant, _: &Resource| {
//!             Some(Limit::Bounded(5))
//!         }))
//!         .counter(StoredResourceCounter::new(
//!             "recipes",
//!             ["recipe"],
//!             Arc::new(MemoryStorage::new()),
//!         ))
//!         .build()?;
//!
//!     let tenant = Tenant::from("acme");
//!     let recipe = Resource::from("recipe");
//!     assert!(manager.acquire(&tenant, &recipe, 5).await?.allowed());
//!     assert!(!manager.check_one(&tenant, &recipe).await?.allowed());
//!     Ok(())
//! }
//! ```

use crate::constants::{DEFAULT_AMOUNT, MIN_AMOUNT};
use crate::counter::ResourceCounter;
use crate::error::QuotaError;
use crate::limit::{EmptyQuotaLimitResolver, QuotaLimitResolver};
#[cfg(feature = "monitoring")]
use crate::metrics::QuotaMetrics;
use crate::registry::{
    DefaultResourceCounterRegistry, ResourceCounterRegistry, ResourceCounterRegistryBuilder,
};
use crate::resource::Resource;
use crate::result::QuotaResult;
use crate::state::QuotaState;
use crate::tenant::Tenant;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Rejects amounts below [`MIN_AMOUNT`]
fn validate_amount(amount: u64) -> Result<u64, QuotaError> {
    if amount < MIN_AMOUNT {
        return Err(QuotaError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Quota decision engine
#[derive(Clone)]
pub struct QuotaManager {
    registry: Arc<dyn ResourceCounterRegistry>,
    limit_resolver: Arc<dyn QuotaLimitResolver>,
    #[cfg(feature = "monitoring")]
    metrics: Option<Arc<QuotaMetrics>>,
}

impl std::fmt::Debug for QuotaManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaManager").finish_non_exhaustive()
    }
}

impl QuotaManager {
    /// Creates a quota manager
    ///
    /// # Arguments
    /// - `registry`: dispatches resources to their counters
    /// - `limit_resolver`: answers the configured limit
    pub fn new(
        registry: Arc<dyn ResourceCounterRegistry>,
        limit_resolver: Arc<dyn QuotaLimitResolver>,
    ) -> Self {
        Self {
            registry,
            limit_resolver,
            #[cfg(feature = "monitoring")]
            metrics: None,
        }
    }

    pub fn builder() -> QuotaManagerBuilder {
        QuotaManagerBuilder::new()
    }

    /// Current usage and limit, or `None` when no quota is configured.
    ///
    /// Limit and usage are always read together; `check` and `acquire`
    /// decide on the same snapshot.
    ///
    /// # Returns
    /// - `Ok(Some(state))`: fresh snapshot
    /// - `Ok(None)`: no quota configured
    /// - `Err(QuotaError::CounterNotFound)`: a limit exists but no counter
    ///   supports the resource
    #[instrument(skip_all, fields(tenant = %tenant, resource = %resource))]
    pub async fn get_state(
        &self,
        tenant: &Tenant,
        resource: &Resource,
    ) -> Result<Option<QuotaState>, QuotaError> {
        Ok(self
            .snapshot(tenant, resource)
            .await?
            .map(|(_, state)| state))
    }

    /// Whether the tenant may consume `amount` more units. Never mutates.
    #[instrument(skip_all, fields(tenant = %tenant, resource = %resource, amount = amount))]
    pub async fn check(
        &self,
        tenant: &Tenant,
        resource: &Resource,
        amount: u64,
    ) -> Result<QuotaResult, QuotaError> {
        let started = Instant::now();
        let result = self.decide_check(tenant, resource, amount).await;
        self.observe("check", &result, started);
        result
    }

    /// [`check`](Self::check) for a single unit
    pub async fn check_one(
        &self,
        tenant: &Tenant,
        resource: &Resource,
    ) -> Result<QuotaResult, QuotaError> {
        self.check(tenant, resource, DEFAULT_AMOUNT).await
    }

    /// Checks and, when allowed, reserves `amount` units on the counter.
    ///
    /// A denied or unconfigured decision is returned without touching the
    /// counter. The limit resolved for the check is the one reported in the
    /// returned state; it is not resolved a second time.
    #[instrument(skip_all, fields(tenant = %tenant, resource = %resource, amount = amount))]
    pub async fn acquire(
        &self,
        tenant: &Tenant,
        resource: &Resource,
        amount: u64,
    ) -> Result<QuotaResult, QuotaError> {
        let started = Instant::now();
        let result = self.decide_acquire(tenant, resource, amount).await;
        self.observe("acquire", &result, started);
        result
    }

    /// [`acquire`](Self::acquire) for a single unit
    pub async fn acquire_one(
        &self,
        tenant: &Tenant,
        resource: &Resource,
    ) -> Result<QuotaResult, QuotaError> {
        self.acquire(tenant, resource, DEFAULT_AMOUNT).await
    }

    /// Gives back `amount` units.
    ///
    /// The counter is always decremented (clamped at zero) when a quota is
    /// configured. The result only reports whether usage is still above the
    /// limit afterwards: `Denied` means the tenant remains over quota.
    #[instrument(skip_all, fields(tenant = %tenant, resource = %resource, amount = amount))]
    pub async fn release(
        &self,
        tenant: &Tenant,
        resource: &Resource,
        amount: u64,
    ) -> Result<QuotaResult, QuotaError> {
        let started = Instant::now();
        let result = self.decide_release(tenant, resource, amount).await;
        self.observe("release", &result, started);
        result
    }

    /// [`release`](Self::release) for a single unit
    pub async fn release_one(
        &self,
        tenant: &Tenant,
        resource: &Resource,
    ) -> Result<QuotaResult, QuotaError> {
        self.release(tenant, resource, DEFAULT_AMOUNT).await
    }

    pub fn registry(&self) -> &Arc<dyn ResourceCounterRegistry> {
        &self.registry
    }

    pub fn limit_resolver(&self) -> &Arc<dyn QuotaLimitResolver> {
        &self.limit_resolver
    }

    async fn decide_check(
        &self,
        tenant: &Tenant,
        resource: &Resource,
        amount: u64,
    ) -> Result<QuotaResult, QuotaError> {
        let amount = validate_amount(amount)?;
        let Some((_, state)) = self.snapshot(tenant, resource).await? else {
            debug!("no quota configured");
            return Ok(QuotaResult::NoQuota(resource.clone()));
        };

        if state.admits(amount) {
            debug!(used = state.used, limit = %state.limit, "quota check allowed");
            Ok(QuotaResult::Allowed(state))
        } else {
            debug!(used = state.used, limit = %state.limit, "quota check denied");
            Ok(QuotaResult::Denied(state))
        }
    }

    async fn decide_acquire(
        &self,
        tenant: &Tenant,
        resource: &Resource,
        amount: u64,
    ) -> Result<QuotaResult, QuotaError> {
        let amount = validate_amount(amount)?;
        let Some((counter, state)) = self.snapshot(tenant, resource).await? else {
            debug!("no quota configured, nothing reserved");
            return Ok(QuotaResult::NoQuota(resource.clone()));
        };

        if !state.admits(amount) {
            debug!(used = state.used, limit = %state.limit, "acquire denied");
            return Ok(QuotaResult::Denied(state));
        }

        counter.increment(tenant, resource, amount).await?;
        let used = counter.count(tenant, resource).await?;
        debug!(
            counter = counter.name(),
            used,
            limit = %state.limit,
            "quota acquired"
        );
        Ok(QuotaResult::Allowed(QuotaState::new(
            state.tenant,
            state.resource,
            used,
            state.limit,
        )))
    }

    async fn decide_release(
        &self,
        tenant: &Tenant,
        resource: &Resource,
        amount: u64,
    ) -> Result<QuotaResult, QuotaError> {
        let amount = validate_amount(amount)?;
        let Some(limit) = self.limit_resolver.resolve(tenant, resource).await else {
            debug!("no quota configured, nothing released");
            return Ok(QuotaResult::NoQuota(resource.clone()));
        };

        let counter = self.registry.get_resource_counter(tenant, resource)?;
        let used_before = counter.count(tenant, resource).await?;
        counter.decrement(tenant, resource, amount).await?;
        let used = counter.count(tenant, resource).await?;
        let state = QuotaState::new(tenant.clone(), resource.clone(), used, limit);

        if limit.is_exceeded_by(used_before.saturating_sub(amount)) {
            warn!(
                used_before,
                used,
                limit = %limit,
                "released but still over quota"
            );
            Ok(QuotaResult::Denied(state))
        } else {
            debug!(used, limit = %limit, "quota released");
            Ok(QuotaResult::Allowed(state))
        }
    }

    /// The single read path: resolve the limit, then count on the counter
    /// owning the resource.
    async fn snapshot(
        &self,
        tenant: &Tenant,
        resource: &Resource,
    ) -> Result<Option<(Arc<dyn ResourceCounter>, QuotaState)>, QuotaError> {
        let Some(limit) = self.limit_resolver.resolve(tenant, resource).await else {
            return Ok(None);
        };
        let counter = self.registry.get_resource_counter(tenant, resource)?;
        let used = counter.count(tenant, resource).await?;
        Ok(Some((
            counter,
            QuotaState::new(tenant.clone(), resource.clone(), used, limit),
        )))
    }

    #[cfg(feature = "monitoring")]
    fn observe(
        &self,
        operation: &str,
        result: &Result<QuotaResult, QuotaError>,
        started: Instant,
    ) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        match result {
            Ok(decision) => {
                metrics.record_decision(operation, decision.outcome(), started.elapsed())
            }
            Err(QuotaError::CounterNotFound(_)) => metrics.record_counter_not_found(),
            Err(QuotaError::StorageError(_)) => metrics.record_storage_error(),
            Err(_) => {}
        }
    }

    #[cfg(not(feature = "monitoring"))]
    fn observe(
        &self,
        _operation: &str,
        _result: &Result<QuotaResult, QuotaError>,
        _started: Instant,
    ) {
    }
}

/// Builder for [`QuotaManager`].
///
/// Without an explicit resolver the manager uses [`EmptyQuotaLimitResolver`]
/// and allows everything. Counters added with [`counter`](Self::counter)
/// form a [`DefaultResourceCounterRegistry`] in insertion order; they cannot
/// be combined with an explicit [`registry`](Self::registry).
#[derive(Default)]
pub struct QuotaManagerBuilder {
    registry: Option<Arc<dyn ResourceCounterRegistry>>,
    counters: ResourceCounterRegistryBuilder,
    counter_count: usize,
    limit_resolver: Option<Arc<dyn QuotaLimitResolver>>,
    #[cfg(feature = "monitoring")]
    metrics: Option<Arc<QuotaMetrics>>,
}

impl QuotaManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom registry
    pub fn registry<R: ResourceCounterRegistry + 'static>(mut self, registry: R) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    pub fn registry_arc(mut self, registry: Arc<dyn ResourceCounterRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Appends a counter to the default registry
    pub fn counter<C: ResourceCounter + 'static>(mut self, counter: C) -> Self {
        self.counters = self.counters.register(counter);
        self.counter_count += 1;
        self
    }

    pub fn counter_arc(mut self, counter: Arc<dyn ResourceCounter>) -> Self {
        self.counters = self.counters.register_arc(counter);
        self.counter_count += 1;
        self
    }

    pub fn limit_resolver<L: QuotaLimitResolver + 'static>(mut self, resolver: L) -> Self {
        self.limit_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn limit_resolver_arc(mut self, resolver: Arc<dyn QuotaLimitResolver>) -> Self {
        self.limit_resolver = Some(resolver);
        self
    }

    #[cfg(feature = "monitoring")]
    pub fn metrics(mut self, metrics: Arc<QuotaMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// # Returns
    /// - `Err(QuotaError::ConfigError)`: both a registry and counters given
    pub fn build(self) -> Result<QuotaManager, QuotaError> {
        let registry: Arc<dyn ResourceCounterRegistry> = match self.registry {
            Some(_) if self.counter_count > 0 => {
                return Err(QuotaError::ConfigError(
                    "counters cannot be added to an explicitly provided registry".to_string(),
                ));
            }
            Some(registry) => registry,
            None => Arc::new(self.counters.build()),
        };
        let limit_resolver = self
            .limit_resolver
            .unwrap_or_else(|| Arc::new(EmptyQuotaLimitResolver));

        Ok(QuotaManager {
            registry,
            limit_resolver,
            #[cfg(feature = "monitoring")]
            metrics: self.metrics,
        })
    }
}

impl From<DefaultResourceCounterRegistry> for QuotaManagerBuilder {
    fn from(registry: DefaultResourceCounterRegistry) -> Self {
        QuotaManagerBuilder::new().registry(registry)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
