//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Quota decision outcome

use crate::resource::Resource;
use crate::state::QuotaState;
use serde::{Deserialize, Serialize};

/// Outcome of a check, acquire or release.
///
/// `NoQuota` is kept apart from `Allowed` so callers can tell "under the
/// limit" from "no limit configured at all".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QuotaResult {
    /// Within the limit
    Allowed(QuotaState),
    /// The limit would be (or still is) exceeded
    Denied(QuotaState),
    /// No quota configured, permitted by default
    NoQuota(Resource),
}

impl QuotaResult {
    /// True for `Allowed` and `NoQuota`, false only for `Denied`
    pub fn allowed(&self) -> bool {
        !matches!(self, QuotaResult::Denied(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, QuotaResult::Denied(_))
    }

    pub fn is_no_quota(&self) -> bool {
        matches!(self, QuotaResult::NoQuota(_))
    }

    /// Snapshot behind the decision; absent for `NoQuota`
    pub fn state(&self) -> Option<&QuotaState> {
        match self {
            QuotaResult::Allowed(state) | QuotaResult::Denied(state) => Some(state),
            QuotaResult::NoQuota(_) => None,
        }
    }

    pub fn into_state(self) -> Option<QuotaState> {
        match self {
            QuotaResult::Allowed(state) | QuotaResult::Denied(state) => Some(state),
            QuotaResult::NoQuota(_) => None,
        }
    }

    /// Resource the decision is about
    pub fn resource(&self) -> &Resource {
        match self {
            QuotaResult::Allowed(state) | QuotaResult::Denied(state) => &state.resource,
            QuotaResult::NoQuota(resource) => resource,
        }
    }

    /// Stable label for logs and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            QuotaResult::Allowed(_) => "allowed",
            QuotaResult::Denied(_) => "denied",
            QuotaResult::NoQuota(_) => "no_quota",
        }
    }
}
