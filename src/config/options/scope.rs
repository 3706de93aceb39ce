//! Scope (site) identifiers and resolution

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Partition within which option keys are unique, e.g. a site id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct Scope(i64);

impl Scope {
    /// Scope used when neither settings nor the caller name one
    pub const DEFAULT: Scope = Scope(1);

    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> i64 {
        self.0
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i64> for Scope {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Scope {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Scope)
    }
}

/// Picks the scope a manager is bound to: an explicit override when given,
/// otherwise the process-wide default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeResolver {
    default: Scope,
}

impl ScopeResolver {
    pub fn new(default: Scope) -> Self {
        Self { default }
    }

    /// The process-wide default scope
    pub fn default_scope(&self) -> Scope {
        self.default
    }

    pub fn resolve(&self, explicit: Option<Scope>) -> Scope {
        explicit.unwrap_or(self.default)
    }
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new(Scope::DEFAULT)
    }
}
