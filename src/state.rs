//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Quota state snapshot

use crate::limit::Limit;
use crate::resource::Resource;
use crate::tenant::Tenant;
use serde::{Deserialize, Serialize};

/// Usage and limit of one tenant for one resource, read together within a
/// single decision.
///
/// `used` may exceed the limit: that is exactly what a denial reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    pub tenant: Tenant,
    pub resource: Resource,
    pub used: u64,
    pub limit: Limit,
}

impl QuotaState {
    pub fn new(tenant: Tenant, resource: Resource, used: u64, limit: Limit) -> Self {
        Self {
            tenant,
            resource,
            used,
            limit,
        }
    }

    /// Whether `amount` more units fit
    pub fn admits(&self, amount: u64) -> bool {
        self.limit.admits(self.used, amount)
    }

    /// Units left before the limit binds, `None` when unlimited
    pub fn remaining(&self) -> Option<u64> {
        self.limit.remaining(self.used)
    }

    /// Whether usage is already strictly above the limit
    pub fn is_over_limit(&self) -> bool {
        self.limit.is_exceeded_by(self.used)
    }
}
