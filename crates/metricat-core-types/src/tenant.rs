//! Explicit tenant context.
//!
//! Every tenant-scoped storage call takes a `TenantContext` parameter
//! instead of relying on ambient schema-switching state.

use serde::{Deserialize, Serialize};

/// Identifies the tenant a catalog operation acts on.
///
/// The name doubles as the tenant's schema name; derived values
/// (default metric group) are computed from it deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantContext {
    name: String,
}

impl TenantContext {
    /// Create a context for the named tenant.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The tenant's schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default group assigned to freshly imported metrics:
    /// the tenant name uppercased.
    pub fn default_group(&self) -> String {
        self.name.to_uppercase()
    }
}

impl std::fmt::Display for TenantContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
