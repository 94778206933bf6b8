//! Usage storage
//!
//! Usage storage for counter-based quotas: running totals per
//! (tenant, resource kind) that are moved by explicit increments and
//! decrements rather than derived by counting persisted rows.

use crate::error::StorageError;
use crate::resource::ResourceKind;
use crate::tenant::Tenant;
use async_trait::async_trait;
use dashmap::DashMap;

/// Key of a usage cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsageKey {
    pub tenant: Tenant,
    pub kind: ResourceKind,
}

impl UsageKey {
    pub fn new(tenant: &Tenant, kind: &ResourceKind) -> Self {
        Self {
            tenant: tenant.clone(),
            kind: kind.clone(),
        }
    }
}

/// Usage storage interface
///
/// Every operation must be linearizable per key.
#[async_trait]
pub trait UsageStorage: Send + Sync {
    /// Current usage, zero for an unknown key
    async fn get_usage(&self, key: &UsageKey) -> Result<u64, StorageError>;

    /// Adds `amount` and returns the new usage.
    ///
    /// Fails with [`StorageError::Overflow`] and leaves usage unchanged when
    /// the sum does not fit.
    async fn add_usage(&self, key: &UsageKey, amount: u64) -> Result<u64, StorageError>;

    /// Subtracts `amount` clamped at zero and returns the new usage.
    /// A key that reaches zero may be forgotten.
    async fn sub_usage(&self, key: &UsageKey, amount: u64) -> Result<u64, StorageError>;

    /// Forgets the usage of a key
    async fn reset(&self, key: &UsageKey) -> Result<(), StorageError>;
}

/// In-memory usage storage
///
/// One DashMap entry per key; the entry guard serializes concurrent updates
/// of the same key while different keys proceed independently.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    usage: DashMap<UsageKey, u64>,
}

impl MemoryStorage {
    /// Creates an empty storage
    pub fn new() -> Self {
        Self {
            usage: DashMap::new(),
        }
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.usage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usage.is_empty()
    }
}

#[async_trait]
impl UsageStorage for MemoryStorage {
    async fn get_usage(&self, key: &UsageKey) -> Result<u64, StorageError> {
        Ok(self.usage.get(key).map(|entry| *entry).unwrap_or(0))
    }

    async fn add_usage(&self, key: &UsageKey, amount: u64) -> Result<u64, StorageError> {
        let mut entry = self.usage.entry(key.clone()).or_insert(0);
        let Some(used) = entry.checked_add(amount) else {
            return Err(StorageError::Overflow(format!(
                "{}/{}: {} + {}",
                key.tenant, key.kind, *entry, amount
            )));
        };
        *entry = used;
        Ok(used)
    }

    async fn sub_usage(&self, key: &UsageKey, amount: u64) -> Result<u64, StorageError> {
        // unknown keys are not created
        let used = match self.usage.get_mut(key) {
            Some(mut entry) => {
                *entry = entry.saturating_sub(amount);
                *entry
            }
            None => return Ok(0),
        };
        if used == 0 {
            self.usage.remove_if(key, |_, v| *v == 0);
        }
        Ok(used)
    }

    async fn reset(&self, key: &UsageKey) -> Result<(), StorageError> {
        self.usage.remove(key);
        Ok(())
    }
}
