//! Prelude module - Commonly used types for quick imports
//!
//! This module re-exports the most commonly used types from Quotaron,
//! allowing users to import them with a single `use quotaron::prelude::*;`
//! statement instead of importing each type individually.

// Core types - always available
pub use crate::error::QuotaError;
pub use crate::limit::{Limit, QuotaLimitResolver};
pub use crate::manager::QuotaManager;
pub use crate::resource::{Resource, ResourceKind};
pub use crate::result::QuotaResult;
pub use crate::state::QuotaState;
pub use crate::tenant::{Tenant, TenantResolver};

// Counters
pub use crate::counter::ResourceCounter;
pub use crate::registry::{DefaultResourceCounterRegistry, ResourceCounterRegistry};

// Configuration and guard
pub use crate::config::{ConfigQuotaLimitResolver, QuotaLimitsConfig};
pub use crate::guard::QuotaGuard;

// Feature-gated exports
#[cfg(feature = "monitoring")]
pub use crate::metrics::QuotaMetrics;
