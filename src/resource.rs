//! Copyright (c) 2026, Kirky.X
//!
//! MIT License
//!
//! Resource designators
//!
//! A quota is checked against either a resource kind (`"recipe"`) or a
//! concrete instance of that kind (`recipe #17`). Counters and resolvers only
//! ever dispatch on the kind; the instance id is carried through untouched.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Kind tag of a resource, e.g. `recipe` or `recipe_book`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(Cow<'static, str>);

impl ResourceKind {
    /// Kind from a static name, usable in `const` tables
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ResourceKind {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for ResourceKind {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// What a quota decision is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    /// The resource type itself
    Kind { kind: ResourceKind },
    /// A concrete resource instance
    Instance { kind: ResourceKind, id: String },
}

impl Resource {
    pub fn kind_of(kind: impl Into<ResourceKind>) -> Self {
        Resource::Kind { kind: kind.into() }
    }

    pub fn instance(kind: impl Into<ResourceKind>, id: impl Into<String>) -> Self {
        Resource::Instance {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// The kind every dispatch decision is keyed on
    pub fn kind(&self) -> &ResourceKind {
        match self {
            Resource::Kind { kind } => kind,
            Resource::Instance { kind, .. } => kind,
        }
    }

    /// Instance id, if this designates a concrete resource
    pub fn instance_id(&self) -> Option<&str> {
        match self {
            Resource::Kind { .. } => None,
            Resource::Instance { id, .. } => Some(id),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Kind { kind } => write!(f, "{}", kind),
            Resource::Instance { kind, id } => write!(f, "{}#{}", kind, id),
        }
    }
}

impl From<ResourceKind> for Resource {
    fn from(kind: ResourceKind) -> Self {
        Resource::Kind { kind }
    }
}

impl From<&'static str> for Resource {
    fn from(name: &'static str) -> Self {
        Resource::kind_of(name)
    }
}

impl From<String> for Resource {
    fn from(name: String) -> Self {
        Resource::kind_of(name)
    }
}
