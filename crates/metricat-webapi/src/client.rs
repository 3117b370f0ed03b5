//! Blocking HTTP client for the profile-synchronization web API.

use std::collections::BTreeMap;

use metricat_core::errors::{CatalogError, Result};
use metricat_core::ops::FetchedProfile;
use metricat_core::sync::ProfileSync;
use metricat_core_types::TenantContext;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::config::WebApiConfig;
use crate::wire::{ProfileDocument, ProfileList};

/// Degraded-rename warning for a failed GET or PUT.
pub(crate) fn status_warning(tenant: &str, status: &str) -> String {
    format!(
        "{}: Error trying to update metric in metric profiles: {}.\nPlease update metric profiles manually.",
        tenant.to_uppercase(),
        status
    )
}

/// Degraded-rename warning for a tenant without a `WEB-API` key.
pub(crate) fn key_warning(tenant: &str) -> String {
    format!(
        "{}: No \"WEB-API\" key in the DB!\nPlease update metric profiles manually.",
        tenant.to_uppercase()
    )
}

/// Client for the external profile catalog.
///
/// `GET {endpoint}` lists profiles wrapped in `{"data": [...]}`;
/// `PUT {endpoint}/{id}` replaces one profile's body. Authentication is a
/// static `x-api-key` header per tenant. Calls are bounded by the
/// configured timeout and never retried.
pub struct WebApiClient {
    config: WebApiConfig,
    http: Client,
}

impl WebApiClient {
    /// # Errors
    ///
    /// Returns `WebApi` if the underlying HTTP client cannot be built.
    pub fn new(config: WebApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::WebApi {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { config, http })
    }

    /// GET the full profile list with one tenant's key. The error value is
    /// the status or transport failure text, ready for warning formatting.
    fn fetch_profiles(&self, key: &str) -> std::result::Result<Vec<ProfileDocument>, String> {
        let response = self
            .http
            .get(&self.config.endpoint)
            .header(ACCEPT, "application/json")
            .header("x-api-key", key)
            .send()
            .map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(status.to_string());
        }
        let list: ProfileList = response.json().map_err(|e| e.to_string())?;
        Ok(list.data)
    }

    /// PUT one profile's body back.
    fn put_profile(
        &self,
        key: &str,
        doc: &ProfileDocument,
    ) -> std::result::Result<(), String> {
        let url = format!("{}/{}", self.config.endpoint, doc.id);
        let response = self
            .http
            .put(&url)
            .header(ACCEPT, "application/json")
            .header("x-api-key", key)
            .json(doc)
            .send()
            .map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(status.to_string());
        }
        Ok(())
    }

    /// Fetch one tenant's profile catalog in the reduced form consumed by
    /// the local reconciliation pass.
    ///
    /// # Errors
    ///
    /// `ApiKeyMissing` if the tenant has no key; `WebApi` on transport or
    /// non-2xx failures.
    pub fn fetch_catalog(&self, tenant: &TenantContext) -> Result<Vec<FetchedProfile>> {
        let key = self
            .config
            .key_for(tenant)
            .ok_or_else(|| CatalogError::ApiKeyMissing {
                tenant: tenant.name().to_string(),
            })?;
        let docs = self
            .fetch_profiles(key.expose())
            .map_err(|message| CatalogError::WebApi { message })?;
        Ok(docs.iter().map(ProfileDocument::to_fetched).collect())
    }
}

impl ProfileSync for WebApiClient {
    fn rename_metric(&mut self, old: &str, new: &str) -> Vec<String> {
        let mut warnings = Vec::new();
        let tenants: Vec<(String, Option<String>)> = self
            .config
            .tenants()
            .map(|(name, key)| (name.to_string(), key.map(|k| k.expose().clone())))
            .collect();

        for (tenant, key) in tenants {
            let Some(key) = key else {
                warn!(tenant = %tenant, "no WEB-API key configured");
                warnings.push(key_warning(&tenant));
                continue;
            };
            let docs = match self.fetch_profiles(&key) {
                Ok(docs) => docs,
                Err(status) => {
                    warn!(tenant = %tenant, status = %status, "profile fetch failed");
                    warnings.push(status_warning(&tenant, &status));
                    continue;
                }
            };
            for mut doc in docs {
                if !doc.rename_metric(old, new) {
                    continue;
                }
                debug!(tenant = %tenant, profile = %doc.name, %old, %new, "rewriting profile");
                if let Err(status) = self.put_profile(&key, &doc) {
                    warn!(tenant = %tenant, status = %status, "profile update failed");
                    warnings.push(status_warning(&tenant, &status));
                }
            }
        }
        warnings
    }

    fn metrics_in_profiles(
        &self,
        tenant: &TenantContext,
    ) -> Result<BTreeMap<String, Vec<String>>> {
        let key = self
            .config
            .key_for(tenant)
            .ok_or_else(|| CatalogError::ApiKeyMissing {
                tenant: tenant.name().to_string(),
            })?;
        let docs = self
            .fetch_profiles(key.expose())
            .map_err(|message| CatalogError::WebApi { message })?;

        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for doc in &docs {
            for entry in &doc.services {
                for metric in &entry.metrics {
                    let profiles = map.entry(metric.clone()).or_default();
                    if !profiles.contains(&doc.name) {
                        profiles.push(doc.name.clone());
                    }
                }
            }
        }
        for profiles in map.values_mut() {
            profiles.sort();
        }
        Ok(map)
    }

    fn delete_metrics_from_profile(
        &mut self,
        tenant: &TenantContext,
        profile_apiid: &str,
        metrics: &[String],
    ) -> Result<()> {
        let key = self
            .config
            .key_for(tenant)
            .ok_or_else(|| CatalogError::WebApi {
                message: "Error deleting metric from profile: API key not found.".to_string(),
            })?
            .expose()
            .clone();
        let docs = self
            .fetch_profiles(&key)
            .map_err(|message| CatalogError::WebApi { message })?;
        let mut doc = docs
            .into_iter()
            .find(|doc| doc.id == profile_apiid)
            .ok_or_else(|| CatalogError::WebApi {
                message: "Error deleting metric from profile: Profile not found.".to_string(),
            })?;
        if doc.remove_metrics(metrics) {
            self.put_profile(&key, &doc)
                .map_err(|message| CatalogError::WebApi { message })?;
        }
        Ok(())
    }
}
