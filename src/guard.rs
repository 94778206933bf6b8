//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Quota guard
//!
//! Wraps an operation with a quota decision: the tenant is taken from a
//! typed extractor over the operation's input or from the configured
//! [`TenantResolver`], and a denial is turned into
//! [`QuotaError::QuotaExceeded`]. The resource is fixed per guard unless a
//! resource extractor reads it from the input as well.
//!
//! # Example
//!
//! ```rust
//! use quotaron::prelude::*;
//! use quotaron::counter::StoredResourceCounter;
//! use quotaron::limit::FixedQuotaLimitResolver;
//! use quotaron::storage::MemoryStorage;
//! use std::sync::Arc;
//!
//! struct NewRecipe {
//!     author: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuotaError> {
//!     let manager = QuotaManager::builder()
//!         .limit_resolver(FixedQuotaLimitResolver(Some(Limit::Bounded(1))))
//!         .counter(StoredResourceCounter::new(
//!             "recipes",
//!             ["recipe"],
//!             Arc::new(MemoryStorage::new()),
//!         ))
//!         .build()?;
//!
//!     let guard = QuotaGuard::<NewRecipe>::new(manager, "recipe")
//!         .with_tenant_fn(|r: &NewRecipe| Ok(Tenant::from(r.author.as_str())));
//!
//!     let input = NewRecipe { author: "ann".into() };
//!     let id = guard
//!         .run_acquired(&input, async { Ok::<_, QuotaError>(17) })
//!         .await?;
//!     assert_eq!(id, 17);
//!     assert!(guard.check(&input).await.is_err());
//!     Ok(())
//! }
//! ```

use crate::constants::{DEFAULT_AMOUNT, DEFAULT_EXCEEDED_MESSAGE_PREFIX};
use crate::error::QuotaError;
use crate::manager::QuotaManager;
use crate::resource::{Resource, ResourceKind};
use crate::result::QuotaResult;
use crate::tenant::{NoTenantResolver, Tenant, TenantResolver};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

type TenantFn<A> = dyn Fn(&A) -> Result<Tenant, QuotaError> + Send + Sync;
type ResourceFn<A> = dyn Fn(&A) -> Resource + Send + Sync;

/// Quota check bound to one resource kind, cost and message.
///
/// `A` is the input the guarded operation works on; extractors registered
/// with [`with_tenant_fn`](Self::with_tenant_fn) and
/// [`with_resource_fn`](Self::with_resource_fn) read it.
pub struct QuotaGuard<A = ()> {
    manager: QuotaManager,
    tenant_resolver: Arc<dyn TenantResolver>,
    tenant_fn: Option<Arc<TenantFn<A>>>,
    resource: Resource,
    resource_fn: Option<Arc<ResourceFn<A>>>,
    cost: u64,
    message: Option<String>,
}

impl<A> Clone for QuotaGuard<A> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            tenant_resolver: self.tenant_resolver.clone(),
            tenant_fn: self.tenant_fn.clone(),
            resource: self.resource.clone(),
            resource_fn: self.resource_fn.clone(),
            cost: self.cost,
            message: self.message.clone(),
        }
    }
}

impl<A> std::fmt::Debug for QuotaGuard<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaGuard")
            .field("resource", &self.resource)
            .field("cost", &self.cost)
            .field("message", &self.message)
            .field("tenant_fn", &self.tenant_fn.is_some())
            .field("resource_fn", &self.resource_fn.is_some())
            .finish()
    }
}

impl<A> QuotaGuard<A> {
    /// Guard with cost 1 and no tenant source; set one with
    /// [`tenant_resolver`](Self::tenant_resolver) or
    /// [`with_tenant_fn`](Self::with_tenant_fn).
    pub fn new(manager: QuotaManager, resource: impl Into<Resource>) -> Self {
        Self {
            manager,
            tenant_resolver: Arc::new(NoTenantResolver),
            tenant_fn: None,
            resource: resource.into(),
            resource_fn: None,
            cost: DEFAULT_AMOUNT,
            message: None,
        }
    }

    pub fn tenant_resolver<R: TenantResolver + 'static>(mut self, resolver: R) -> Self {
        self.tenant_resolver = Arc::new(resolver);
        self
    }

    pub fn tenant_resolver_arc(mut self, resolver: Arc<dyn TenantResolver>) -> Self {
        self.tenant_resolver = resolver;
        self
    }

    /// Takes the tenant from the operation input, overriding the resolver
    pub fn with_tenant_fn<F>(mut self, tenant_fn: F) -> Self
    where
        F: Fn(&A) -> Result<Tenant, QuotaError> + Send + Sync + 'static,
    {
        self.tenant_fn = Some(Arc::new(tenant_fn));
        self
    }

    /// Takes the resource from the operation input, e.g. a
    /// [`Resource::instance`] of the record being written.
    pub fn with_resource_fn<F>(mut self, resource_fn: F) -> Self
    where
        F: Fn(&A) -> Resource + Send + Sync + 'static,
    {
        self.resource_fn = Some(Arc::new(resource_fn));
        self
    }

    /// Units consumed per call
    pub fn cost(mut self, cost: u64) -> Self {
        self.cost = cost;
        self
    }

    /// Message carried by [`QuotaError::QuotaExceeded`]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn kind(&self) -> &ResourceKind {
        self.resource.kind()
    }

    pub fn manager(&self) -> &QuotaManager {
        &self.manager
    }

    pub fn resolve_tenant(&self, input: &A) -> Result<Tenant, QuotaError> {
        match &self.tenant_fn {
            Some(tenant_fn) => tenant_fn(input),
            None => self.tenant_resolver.resolve(),
        }
    }

    pub fn resolve_resource(&self, input: &A) -> Resource {
        match &self.resource_fn {
            Some(resource_fn) => resource_fn(input),
            None => self.resource.clone(),
        }
    }

    /// Checks without consuming.
    ///
    /// # Returns
    /// - `Ok(result)`: allowed, or no quota configured
    /// - `Err(QuotaError::QuotaExceeded)`: denied
    pub async fn check(&self, input: &A) -> Result<QuotaResult, QuotaError> {
        let tenant = self.resolve_tenant(input)?;
        let resource = self.resolve_resource(input);
        let result = self.manager.check(&tenant, &resource, self.cost).await?;
        self.admit(&resource, result)
    }

    /// Checks, then runs `operation` only when admitted
    pub async fn guard<F, T>(&self, input: &A, operation: F) -> Result<T, QuotaError>
    where
        F: Future<Output = T>,
    {
        self.check(input).await?;
        Ok(operation.await)
    }

    /// Reserves the cost on the counter, failing when denied
    pub async fn acquire(&self, input: &A) -> Result<QuotaResult, QuotaError> {
        let tenant = self.resolve_tenant(input)?;
        let resource = self.resolve_resource(input);
        let result = self.manager.acquire(&tenant, &resource, self.cost).await?;
        self.admit(&resource, result)
    }

    /// Gives the cost back. Staying over the limit is not an error here.
    pub async fn release(&self, input: &A) -> Result<QuotaResult, QuotaError> {
        let tenant = self.resolve_tenant(input)?;
        let resource = self.resolve_resource(input);
        self.manager.release(&tenant, &resource, self.cost).await
    }

    /// Acquires, runs `operation`, and releases again if it fails.
    ///
    /// A failed release is logged; the operation's own error is returned.
    pub async fn run_acquired<F, T, E>(&self, input: &A, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<QuotaError>,
    {
        let tenant = self.resolve_tenant(input)?;
        let resource = self.resolve_resource(input);
        let acquired = self.manager.acquire(&tenant, &resource, self.cost).await?;
        let reserved = !acquired.is_no_quota();
        self.admit(&resource, acquired)?;

        let outcome = operation.await;
        if outcome.is_err() && reserved {
            debug!(%tenant, %resource, "operation failed, releasing quota");
            if let Err(e) = self.manager.release(&tenant, &resource, self.cost).await {
                warn!(%tenant, %resource, error = %e, "quota release failed");
            }
        }
        outcome
    }

    fn admit(&self, resource: &Resource, result: QuotaResult) -> Result<QuotaResult, QuotaError> {
        match result {
            QuotaResult::Denied(state) => Err(QuotaError::QuotaExceeded {
                message: self.message.clone().unwrap_or_else(|| {
                    format!("{} {}", DEFAULT_EXCEEDED_MESSAGE_PREFIX, resource.kind())
                }),
                resource: resource.kind().to_string(),
                used: state.used,
                limit: state.limit,
            }),
            admitted => Ok(admitted),
        }
    }
}
