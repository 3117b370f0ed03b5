//! Web API client configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use metricat_core::errors::{CatalogError, Result};
use metricat_core_types::{Sensitive, TenantContext};
use serde::Deserialize;

/// Ceiling on web API calls; failures within it degrade to warnings and are
/// never retried.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Name of the key slot holding the web API token.
pub const API_KEY_NAME: &str = "WEB-API";

#[derive(Debug, Deserialize)]
struct RawConfig {
    endpoint: String,
    timeout_secs: Option<u64>,
}

/// Endpoint, timeout and per-tenant API keys for the profile web API.
///
/// A tenant may be registered without a key; operations on it then degrade
/// or fail with the key-missing message instead of being skipped silently.
#[derive(Debug, Clone)]
pub struct WebApiConfig {
    pub endpoint: String,
    pub timeout: Duration,
    tenants: BTreeMap<String, Option<Sensitive<String>>>,
}

impl WebApiConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
            tenants: BTreeMap::new(),
        }
    }

    /// Load endpoint and timeout from `METRICAT_WEBAPI_*` environment
    /// variables (`ENDPOINT`, optional `TIMEOUT_SECS`).
    ///
    /// # Errors
    ///
    /// Returns `WebApi` if the environment source is missing required
    /// values or fails to deserialize.
    pub fn from_env() -> Result<Self> {
        let raw: RawConfig = config::Config::builder()
            .add_source(config::Environment::with_prefix("METRICAT_WEBAPI"))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| CatalogError::WebApi {
                message: format!("invalid web API configuration: {}", e),
            })?;
        let mut cfg = Self::new(raw.endpoint);
        if let Some(secs) = raw.timeout_secs {
            cfg.timeout = Duration::from_secs(secs);
        }
        Ok(cfg)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a tenant, with or without its `WEB-API` key.
    pub fn add_tenant(&mut self, name: impl Into<String>, key: Option<String>) {
        self.tenants.insert(name.into(), key.map(Sensitive::new));
    }

    /// The tenant's key, if the tenant is registered and has one.
    pub fn key_for(&self, tenant: &TenantContext) -> Option<&Sensitive<String>> {
        self.tenants.get(tenant.name()).and_then(Option::as_ref)
    }

    /// Registered tenants in name order, with their optional keys.
    pub fn tenants(&self) -> impl Iterator<Item = (&str, Option<&Sensitive<String>>)> {
        self.tenants
            .iter()
            .map(|(name, key)| (name.as_str(), key.as_ref()))
    }
}
