//! Shared test helpers
//!
//! Factories and mock counters used across the test suites.

#![allow(dead_code)]

use async_trait::async_trait;
use quotaron::{
    config::{ConfigQuotaLimitResolver, QuotaLimitsConfig},
    counter::{ResourceCounter, StoredResourceCounter},
    error::StorageError,
    limit::{FixedQuotaLimitResolver, Limit},
    manager::QuotaManager,
    resource::Resource,
    storage::MemoryStorage,
    tenant::Tenant,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Installs the test subscriber once
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quotaron=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Count-based counter whose usage is an external row count
pub struct RowCounter {
    kind: &'static str,
    rows: AtomicU64,
    fail: AtomicBool,
}

impl RowCounter {
    pub fn new(kind: &'static str, rows: u64) -> Self {
        Self {
            kind,
            rows: AtomicU64::new(rows),
            fail: AtomicBool::new(false),
        }
    }

    /// Simulates inserted or deleted rows
    pub fn set_rows(&self, rows: u64) {
        self.rows.store(rows, Ordering::SeqCst);
    }

    /// Simulates a storage failure
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResourceCounter for RowCounter {
    fn supports(&self, _tenant: &Tenant, resource: &Resource) -> bool {
        resource.kind().as_str() == self.kind
    }

    async fn count(&self, _tenant: &Tenant, _resource: &Resource) -> Result<u64, StorageError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::QueryError("count failed".to_string()));
        }
        Ok(self.rows.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        self.kind
    }
}

/// Creates an in-memory storage
pub fn create_memory_storage() -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::new())
}

/// Creates a storage-backed counter
pub fn create_stored_counter(
    kinds: &[&'static str],
    storage: Arc<MemoryStorage>,
) -> Arc<StoredResourceCounter<MemoryStorage>> {
    Arc::new(StoredResourceCounter::new(
        "stored",
        kinds.iter().copied(),
        storage,
    ))
}

/// Fixed limit plus a single counter
pub fn create_manager(limit: Option<Limit>, counter: Arc<dyn ResourceCounter>) -> QuotaManager {
    QuotaManager::builder()
        .limit_resolver(FixedQuotaLimitResolver(limit))
        .counter_arc(counter)
        .build()
        .expect("manager should build")
}

/// YAML config plus counters
pub fn create_config_manager(
    yaml: &str,
    counters: Vec<Arc<dyn ResourceCounter>>,
) -> (QuotaManager, Arc<ConfigQuotaLimitResolver>) {
    let config = QuotaLimitsConfig::from_yaml_str(yaml).expect("valid config");
    let resolver = Arc::new(ConfigQuotaLimitResolver::new(&config).expect("valid resolver"));
    let builder = counters
        .into_iter()
        .fold(QuotaManager::builder(), |builder, counter| {
            builder.counter_arc(counter)
        });
    let manager = builder
        .limit_resolver_arc(resolver.clone())
        .build()
        .expect("manager should build");
    (manager, resolver)
}

/// Reads the current usage
pub async fn usage(counter: &dyn ResourceCounter, tenant: &str, kind: &'static str) -> u64 {
    counter
        .count(&Tenant::from(tenant), &Resource::from(kind))
        .await
        .expect("count should succeed")
}
