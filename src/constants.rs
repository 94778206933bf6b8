//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Centralized constants for Quotaron.
//!
//! Magic values used across the crate are defined here with their purpose.

// ============================================================================
// Amount Constants
// ============================================================================

/// Amount used by the single-unit forms `check_one`, `acquire_one` and
/// `release_one`, and the default cost of a [`QuotaGuard`].
///
/// [`QuotaGuard`]: crate::guard::QuotaGuard
pub const DEFAULT_AMOUNT: u64 = 1;

/// Minimum valid amount for check, acquire and release.
///
/// Zero-unit consumption is meaningless for admission control and is
/// rejected with [`QuotaError::InvalidAmount`](crate::QuotaError::InvalidAmount).
pub const MIN_AMOUNT: u64 = 1;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default version string of a limits configuration.
pub const DEFAULT_CONFIG_VERSION: &str = "1.0";

/// Keyword accepted in configuration files in place of a number to declare
/// an explicit unlimited quota.
pub const UNLIMITED_KEYWORD: &str = "unlimited";

/// Maximum length of a resource kind name in configuration files.
pub const MAX_RESOURCE_NAME_LENGTH: usize = 128;

/// Maximum length of a tenant id in configuration files.
pub const MAX_TENANT_ID_LENGTH: usize = 256;

// ============================================================================
// Guard Constants
// ============================================================================

/// Prefix of the default message carried by a guard's quota-exceeded error.
///
/// The resource kind is appended: `Quota exceeded for recipe`.
pub const DEFAULT_EXCEEDED_MESSAGE_PREFIX: &str = "Quota exceeded for";
