//! Quota limit configuration
//!
//! Declarative quota limits loaded from YAML, TOML or JSON, and a limit
//! resolver backed by them.
//!
//! ```yaml
//! version: "1.0"
//! limits:
//!   - resource: recipe
//!     limit: 100
//!   - resource: recipe
//!     tenant: acme
//!     limit: unlimited
//! ```
//!
//! A rule without `tenant` is the default for every tenant; a rule naming a
//! tenant overrides it. A resource kind without any rule has no quota.

use crate::constants::{DEFAULT_CONFIG_VERSION, MAX_RESOURCE_NAME_LENGTH, MAX_TENANT_ID_LENGTH};
use crate::error::QuotaError;
use crate::limit::{Limit, QuotaLimitResolver};
use crate::resource::{Resource, ResourceKind};
use crate::tenant::Tenant;
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Quota limit configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaLimitsConfig {
    pub version: String,
    #[serde(default)]
    pub limits: Vec<LimitRule>,
}

impl Default for QuotaLimitsConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_CONFIG_VERSION.to_string(),
            limits: Vec::new(),
        }
    }
}

impl QuotaLimitsConfig {
    /// Validates the whole configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.version.is_empty() {
            return Err("version must not be empty".to_string());
        }

        let mut seen = HashSet::new();
        for (index, rule) in self.limits.iter().enumerate() {
            rule.validate()
                .map_err(|e| format!("limits[{}]: {}", index, e))?;

            if !seen.insert((rule.tenant.as_deref(), rule.resource.as_str())) {
                return Err(format!(
                    "duplicate limit for resource '{}' (tenant: {})",
                    rule.resource,
                    rule.tenant.as_deref().unwrap_or("*")
                ));
            }
        }

        Ok(())
    }

    /// Parses and validates YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self, QuotaError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.checked()
    }

    /// Parses and validates TOML
    pub fn from_toml_str(toml: &str) -> Result<Self, QuotaError> {
        let config: Self = toml::from_str(toml)?;
        config.checked()
    }

    pub fn from_json_str(json: &str) -> Result<Self, QuotaError> {
        let config: Self = serde_json::from_str(json)?;
        config.checked()
    }

    /// Loads a file, picking the format from its extension
    /// (`yaml`/`yml`, `toml` or `json`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, QuotaError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        debug!(path = %path.display(), "loading quota limits");
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(QuotaError::ConfigError(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Rule applying to a tenant and resource kind, tenant rule first
    pub fn find_rule(&self, tenant: &str, resource: &str) -> Option<&LimitRule> {
        self.limits
            .iter()
            .find(|r| r.resource == resource && r.tenant.as_deref() == Some(tenant))
            .or_else(|| {
                self.limits
                    .iter()
                    .find(|r| r.resource == resource && r.tenant.is_none())
            })
    }

    fn checked(self) -> Result<Self, QuotaError> {
        self.validate().map_err(QuotaError::ConfigError)?;
        Ok(self)
    }
}

/// A single limit rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitRule {
    /// Resource kind the rule applies to
    pub resource: String,
    /// Tenant override; absent for the default rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    pub limit: Limit,
}

impl LimitRule {
    pub fn new(resource: impl Into<String>, limit: Limit) -> Self {
        Self {
            resource: resource.into(),
            tenant: None,
            limit,
        }
    }

    pub fn for_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Validates one rule
    pub fn validate(&self) -> Result<(), String> {
        if self.resource.is_empty() {
            return Err("resource must not be empty".to_string());
        }
        if self.resource.len() > MAX_RESOURCE_NAME_LENGTH {
            return Err(format!(
                "resource name longer than {} bytes",
                MAX_RESOURCE_NAME_LENGTH
            ));
        }
        if let Some(tenant) = &self.tenant {
            if tenant.is_empty() {
                return Err("tenant must not be empty when present".to_string());
            }
            if tenant.len() > MAX_TENANT_ID_LENGTH {
                return Err(format!(
                    "tenant id longer than {} bytes",
                    MAX_TENANT_ID_LENGTH
                ));
            }
        }
        Ok(())
    }
}

/// Lookup tables built from a validated config
#[derive(Debug, Default)]
struct LimitTables {
    version: String,
    defaults: HashMap<ResourceKind, Limit>,
    overrides: HashMap<Tenant, HashMap<ResourceKind, Limit>>,
}

impl LimitTables {
    fn build(config: &QuotaLimitsConfig) -> Self {
        let mut tables = LimitTables {
            version: config.version.clone(),
            ..Default::default()
        };
        for rule in &config.limits {
            let kind = ResourceKind::new(rule.resource.clone());
            match &rule.tenant {
                Some(tenant) => {
                    tables
                        .overrides
                        .entry(Tenant::new(tenant.clone()))
                        .or_default()
                        .insert(kind, rule.limit);
                }
                None => {
                    tables.defaults.insert(kind, rule.limit);
                }
            }
        }
        tables
    }

    fn lookup(&self, tenant: &Tenant, kind: &ResourceKind) -> Option<Limit> {
        self.overrides
            .get(tenant)
            .and_then(|limits| limits.get(kind))
            .or_else(|| self.defaults.get(kind))
            .copied()
    }
}

/// Limit resolver over a [`QuotaLimitsConfig`], reloadable at runtime.
///
/// Readers never observe a half-applied reload.
#[derive(Debug)]
pub struct ConfigQuotaLimitResolver {
    tables: RwLock<LimitTables>,
}

impl ConfigQuotaLimitResolver {
    pub fn new(config: &QuotaLimitsConfig) -> Result<Self, QuotaError> {
        config.validate().map_err(QuotaError::ConfigError)?;
        Ok(Self {
            tables: RwLock::new(LimitTables::build(config)),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, QuotaError> {
        Self::new(&QuotaLimitsConfig::from_file(path)?)
    }

    /// Replaces every rule. An invalid config leaves the current rules in place.
    pub fn reload(&self, config: &QuotaLimitsConfig) -> Result<(), QuotaError> {
        config.validate().map_err(QuotaError::ConfigError)?;
        let tables = LimitTables::build(config);
        let previous = std::mem::replace(&mut *self.tables.write(), tables);
        info!(
            from = %previous.version,
            to = %config.version,
            rules = config.limits.len(),
            "quota limits reloaded"
        );
        Ok(())
    }

    /// Version of the active config
    pub fn version(&self) -> String {
        self.tables.read().version.clone()
    }
}

#[async_trait]
impl QuotaLimitResolver for ConfigQuotaLimitResolver {
    async fn resolve(&self, tenant: &Tenant, resource: &Resource) -> Option<Limit> {
        self.tables.read().lookup(tenant, resource.kind())
    }
}
