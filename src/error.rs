//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Error types
//!
//! All error types are defined with thiserror. A denied quota decision is
//! not an error here: it is a [`QuotaResult::Denied`](crate::QuotaResult)
//! value. Only [`QuotaGuard`](crate::guard::QuotaGuard) turns a denial into
//! [`QuotaError::QuotaExceeded`].

use crate::limit::Limit;
use thiserror::Error;

/// Quotaron error type
#[derive(Error, Debug)]
pub enum QuotaError {
    /// No registered resource counter supports the resource kind
    #[error("no resource counter registered for: {0}")]
    CounterNotFound(String),

    /// Amount must be at least one unit
    #[error("invalid amount: {0}, must be at least 1")]
    InvalidAmount(u64),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// The tenant could not be resolved from the caller context
    #[error("tenant could not be resolved: {0}")]
    TenantUnresolved(String),

    /// Quota exceeded, raised by the guard layer only
    #[error("{message}")]
    QuotaExceeded {
        message: String,
        resource: String,
        used: u64,
        limit: Limit,
    },

    /// Storage error reported by a counter
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    /// IO error
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// YAML parse error
    #[error("yaml parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parse error
    #[error("toml parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl QuotaError {
    /// Whether this error signals a configuration bug rather than a runtime
    /// failure of a collaborator.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            QuotaError::CounterNotFound(_)
                | QuotaError::ConfigError(_)
                | QuotaError::TenantUnresolved(_)
                | QuotaError::YamlError(_)
                | QuotaError::TomlError(_)
        )
    }
}

/// Storage error
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Connection error
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// Query error
    #[error("query error: {0}")]
    QueryError(String),

    /// Timeout
    #[error("timeout: {0}")]
    TimeoutError(String),

    /// Usage would not fit the counter
    #[error("usage overflow: {0}")]
    Overflow(String),
}
