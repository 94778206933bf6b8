//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Quotaron - Per-tenant quota admission control
//!
//! Decides whether a tenant may create or consume more units of a resource,
//! based on a configured limit and a live usage count.
//!
//! # API Layers
//!
//! ## Prelude (Quick Start)
//!
//! Use `use quotaron::prelude::*;` to import all commonly used types.
//!
//! ## Core API
//!
//! - [`QuotaManager`] - Decision engine: `get_state`, `check`, `acquire`, `release`
//! - [`QuotaResult`] - `Allowed`, `Denied` or `NoQuota`
//! - [`QuotaLimitResolver`] - Where limits come from
//! - [`ResourceCounter`] / [`ResourceCounterRegistry`] - Where usage comes from
//! - [`QuotaError`] - Error types
//!
//! ## Extensions
//!
//! - [`QuotaGuard`] - Wraps an operation, maps denial to an error
//! - [`ConfigQuotaLimitResolver`] - Limits from YAML/TOML/JSON files
//! - [`MemoryStorage`] / [`StoredResourceCounter`] - Counter-based usage tracking
//! - Prometheus metrics (requires `monitoring` feature)
//!
//! # Examples
//!
//! ```rust
//! use quotaron::prelude::*;
//! use quotaron::counter::StoredResourceCounter;
//! use quotaron::storage::MemoryStorage;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuotaError> {
//!     let config = QuotaLimitsConfig::from_yaml_str(
//!         r#"
//! version: "1.0"
//! limits:
//!   - resource: recipe
//!     limit: 2
//! "#,
//!     )?;
//!
//!     let manager = QuotaManager::builder()
//!         .limit_resolver(ConfigQuotaLimitResolver::new(&config)?)
//!         .counter(StoredResourceCounter::new(
//!             "recipes",
//!             ["recipe"],
//!             Arc::new(MemoryStorage::new()),
//!         ))
//!         .build()?;
//!
//!     let tenant = Tenant::from("acme");
//!     let recipe = Resource::from("recipe");
//!     assert!(manager.acquire(&tenant, &recipe, 2).await?.allowed());
//!     assert!(manager.acquire_one(&tenant, &recipe).await?.is_denied());
//!     Ok(())
//! }
//! ```

pub mod prelude;

pub mod config;
pub mod constants;
pub mod counter;
pub mod error;
pub mod guard;
pub mod limit;
pub mod manager;
#[cfg(feature = "monitoring")]
pub mod metrics;
pub mod registry;
pub mod resource;
pub mod result;
pub mod state;
pub mod storage;
pub mod tenant;

// Re-export commonly used types
pub use config::{ConfigQuotaLimitResolver, LimitRule, QuotaLimitsConfig};
pub use counter::{ResourceCounter, StoredResourceCounter};
pub use error::{QuotaError, StorageError};
pub use guard::QuotaGuard;
pub use limit::{
    EmptyQuotaLimitResolver, FixedQuotaLimitResolver, FnQuotaLimitResolver, Limit,
    QuotaLimitResolver,
};
pub use manager::{QuotaManager, QuotaManagerBuilder};
#[cfg(feature = "monitoring")]
pub use metrics::QuotaMetrics;
pub use registry::{
    DefaultResourceCounterRegistry, ResourceCounterRegistry, ResourceCounterRegistryBuilder,
};
pub use resource::{Resource, ResourceKind};
pub use result::QuotaResult;
pub use state::QuotaState;
pub use storage::{MemoryStorage, UsageKey, UsageStorage};
pub use tenant::{FixedTenantResolver, NoTenantResolver, Tenant, TenantResolver};
