//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Quota limits and limit resolution
//!
//! A resolver answers "how many units of this resource may this tenant own".
//! `None` means no quota is configured and the request is let through;
//! [`Limit::Unlimited`] means a quota policy exists but never binds.

use crate::constants::UNLIMITED_KEYWORD;
use crate::resource::Resource;
use crate::tenant::Tenant;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configured maximum for a (tenant, resource) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LimitRepr", into = "LimitRepr")]
pub enum Limit {
    /// Inclusive maximum number of units
    Bounded(u64),
    /// Configured, but never denies
    Unlimited,
}

impl Limit {
    /// Whether `used + amount` stays within the limit.
    ///
    /// An overflowing sum can never fit a bounded limit.
    pub fn admits(&self, used: u64, amount: u64) -> bool {
        match self {
            Limit::Unlimited => true,
            Limit::Bounded(max) => used
                .checked_add(amount)
                .is_some_and(|total| total <= *max),
        }
    }

    /// Whether `used` is strictly above the limit
    pub fn is_exceeded_by(&self, used: u64) -> bool {
        match self {
            Limit::Unlimited => false,
            Limit::Bounded(max) => used > *max,
        }
    }

    /// Units still available, `None` when unlimited
    pub fn remaining(&self, used: u64) -> Option<u64> {
        match self {
            Limit::Unlimited => None,
            Limit::Bounded(max) => Some(max.saturating_sub(used)),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }

    /// Numeric form, with `u64::MAX` standing for unlimited
    pub fn as_u64(&self) -> u64 {
        match self {
            Limit::Bounded(max) => *max,
            Limit::Unlimited => u64::MAX,
        }
    }
}

/// `u64::MAX` is read as the unlimited sentinel.
impl From<u64> for Limit {
    fn from(value: u64) -> Self {
        if value == u64::MAX {
            Limit::Unlimited
        } else {
            Limit::Bounded(value)
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Bounded(max) => write!(f, "{}", max),
            Limit::Unlimited => f.write_str(UNLIMITED_KEYWORD),
        }
    }
}

/// On-the-wire form: a number or the `unlimited` keyword
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Count(u64),
    Keyword(LimitKeyword),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LimitKeyword {
    Unlimited,
}

impl From<LimitRepr> for Limit {
    fn from(repr: LimitRepr) -> Self {
        match repr {
            LimitRepr::Count(value) => Limit::from(value),
            LimitRepr::Keyword(LimitKeyword::Unlimited) => Limit::Unlimited,
        }
    }
}

impl From<Limit> for LimitRepr {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::Bounded(max) => LimitRepr::Count(max),
            Limit::Unlimited => LimitRepr::Keyword(LimitKeyword::Unlimited),
        }
    }
}

/// Resolves the quota limit for a tenant and resource.
///
/// Must be side-effect free and safe to call concurrently.
#[async_trait]
pub trait QuotaLimitResolver: Send + Sync {
    async fn resolve(&self, tenant: &Tenant, resource: &Resource) -> Option<Limit>;
}

/// Fail-open default: no quota is ever configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyQuotaLimitResolver;

#[async_trait]
impl QuotaLimitResolver for EmptyQuotaLimitResolver {
    async fn resolve(&self, _tenant: &Tenant, _resource: &Resource) -> Option<Limit> {
        None
    }
}

/// One limit for every pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedQuotaLimitResolver(pub Option<Limit>);

#[async_trait]
impl QuotaLimitResolver for FixedQuotaLimitResolver {
    async fn resolve(&self, _tenant: &Tenant, _resource: &Resource) -> Option<Limit> {
        self.0
    }
}

/// Resolver backed by a synchronous closure.
///
/// ```rust
/// use quotaron::limit::{FnQuotaLimitResolver, Limit};
/// use quotaron::{Resource, Tenant};
///
/// let resolver = FnQuotaLimitResolver::new(|_tenant: &Tenant, resource: &Resource| {
///     (resource.kind().as_str() == "recipe").then_some(Limit::Bounded(100))
/// });
/// ```
pub struct FnQuotaLimitResolver<F> {
    resolve_fn: F,
}

impl<F> FnQuotaLimitResolver<F>
where
    F: Fn(&Tenant, &Resource) -> Option<Limit> + Send + Sync,
{
    pub fn new(resolve_fn: F) -> Self {
        Self { resolve_fn }
    }
}

#[async_trait]
impl<F> QuotaLimitResolver for FnQuotaLimitResolver<F>
where
    F: Fn(&Tenant, &Resource) -> Option<Limit> + Send + Sync,
{
    async fn resolve(&self, tenant: &Tenant, resource: &Resource) -> Option<Limit> {
        (self.resolve_fn)(tenant, resource)
    }
}
