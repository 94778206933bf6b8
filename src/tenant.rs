//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Tenant identity and tenant resolution.

use crate::error::QuotaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit of ownership a quota applies to (user, organization, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tenant(String);

impl Tenant {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// String form of the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tenant {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Tenant {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<u64> for Tenant {
    fn from(id: u64) -> Self {
        Self::new(id.to_string())
    }
}

impl From<i64> for Tenant {
    fn from(id: i64) -> Self {
        Self::new(id.to_string())
    }
}

impl From<uuid::Uuid> for Tenant {
    fn from(id: uuid::Uuid) -> Self {
        Self::new(id.to_string())
    }
}

/// Resolves the current tenant from the caller's context.
pub trait TenantResolver: Send + Sync {
    fn resolve(&self) -> Result<Tenant, QuotaError>;
}

impl<F> TenantResolver for F
where
    F: Fn() -> Result<Tenant, QuotaError> + Send + Sync,
{
    fn resolve(&self) -> Result<Tenant, QuotaError> {
        self()
    }
}

/// Always resolves to the same tenant
#[derive(Debug, Clone)]
pub struct FixedTenantResolver {
    tenant: Tenant,
}

impl FixedTenantResolver {
    pub fn new(tenant: impl Into<Tenant>) -> Self {
        Self {
            tenant: tenant.into(),
        }
    }
}

impl TenantResolver for FixedTenantResolver {
    fn resolve(&self) -> Result<Tenant, QuotaError> {
        Ok(self.tenant.clone())
    }
}

/// Default resolver used when none is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTenantResolver;

impl TenantResolver for NoTenantResolver {
    fn resolve(&self) -> Result<Tenant, QuotaError> {
        Err(QuotaError::TenantUnresolved(
            "no tenant resolver configured".to_string(),
        ))
    }
}
