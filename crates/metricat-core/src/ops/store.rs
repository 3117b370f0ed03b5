//! In-memory catalog store.
//!
//! HashMap-based, single-threaded storage (no Arc/RwLock): the shared
//! template catalog plus one isolated store per tenant, each with its own
//! history log. All storage access is encapsulated here.

use std::collections::HashMap;

use metricat_core_types::TenantContext;

use crate::errors::{CatalogError, Result};
use crate::history::HistoryLog;
use crate::model::{
    AggregationProfile, Metric, MetricInstance, MetricProfile, MetricTemplate, Probe, Service,
    TemplateRevision, ThresholdsProfile,
};

/// Shared, tenant-independent catalog of probes and metric templates.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    probes: HashMap<String, Probe>,
    templates: HashMap<String, MetricTemplate>,
    /// Historical revisions per template name, oldest first
    revisions: HashMap<String, Vec<TemplateRevision>>,
    /// Version history for shared entities
    pub history: HistoryLog,
}

impl SharedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_probe(&mut self, probe: Probe) {
        self.probes.insert(probe.name.clone(), probe);
    }

    pub fn probe_exists(&self, name: &str) -> bool {
        self.probes.contains_key(name)
    }

    /// # Errors
    ///
    /// Returns `ProbeNotFound` if no probe with that name exists.
    pub fn remove_probe(&mut self, name: &str) -> Result<Probe> {
        self.probes
            .remove(name)
            .ok_or_else(|| CatalogError::ProbeNotFound {
                name: name.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `ProbeNotFound` if no probe with that name exists.
    pub fn get_probe(&self, name: &str) -> Result<&Probe> {
        self.probes
            .get(name)
            .ok_or_else(|| CatalogError::ProbeNotFound {
                name: name.to_string(),
            })
    }

    pub fn insert_template(&mut self, template: MetricTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    /// # Errors
    ///
    /// Returns `TemplateNotFound` if no template with that name exists.
    pub fn get_template(&self, name: &str) -> Result<&MetricTemplate> {
        self.templates
            .get(name)
            .ok_or_else(|| CatalogError::TemplateNotFound {
                name: name.to_string(),
            })
    }

    pub fn template_exists(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// # Errors
    ///
    /// Returns `TemplateNotFound` if no template with that name exists.
    pub fn remove_template(&mut self, name: &str) -> Result<MetricTemplate> {
        self.templates
            .remove(name)
            .ok_or_else(|| CatalogError::TemplateNotFound {
                name: name.to_string(),
            })
    }

    /// Record a historical revision of a template.
    pub fn add_revision(&mut self, template_name: &str, revision: TemplateRevision) {
        self.revisions
            .entry(template_name.to_string())
            .or_default()
            .push(revision);
    }

    /// Historical revisions of a template, oldest first.
    pub fn revisions(&self, template_name: &str) -> &[TemplateRevision] {
        self.revisions
            .get(template_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Move a template's revision archive under a new name (template rename).
    pub fn rename_revisions(&mut self, old_name: &str, new_name: &str) {
        if let Some(revisions) = self.revisions.remove(old_name) {
            self.revisions.insert(new_name.to_string(), revisions);
        }
    }

    /// Drop a template's revision archive (template deletion).
    pub fn delete_revisions(&mut self, template_name: &str) {
        self.revisions.remove(template_name);
    }
}

/// One tenant's isolated store: local metrics, profile rows, services and
/// the tenant's version history.
#[derive(Debug, Clone, Default)]
pub struct TenantStore {
    /// Metrics keyed by name
    metrics: HashMap<String, Metric>,
    /// Metric profiles keyed by web-API id
    metric_profiles: HashMap<String, MetricProfile>,
    /// Aggregation profiles keyed by web-API id
    aggregation_profiles: HashMap<String, AggregationProfile>,
    /// Thresholds profiles keyed by web-API id
    thresholds_profiles: HashMap<String, ThresholdsProfile>,
    pub services: Vec<Service>,
    pub instances: Vec<MetricInstance>,
    /// Version history for this tenant's entities
    pub history: HistoryLog,
}

impl TenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `MetricNotFound` if no metric with that name exists.
    pub fn get_metric(&self, name: &str) -> Result<&Metric> {
        self.metrics
            .get(name)
            .ok_or_else(|| CatalogError::MetricNotFound {
                name: name.to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `MetricNotFound` if no metric with that name exists.
    pub fn get_metric_mut(&mut self, name: &str) -> Result<&mut Metric> {
        self.metrics
            .get_mut(name)
            .ok_or_else(|| CatalogError::MetricNotFound {
                name: name.to_string(),
            })
    }

    pub fn metric_exists(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn insert_metric(&mut self, metric: Metric) {
        self.metrics.insert(metric.name.clone(), metric);
    }

    /// # Errors
    ///
    /// Returns `MetricNotFound` if no metric with that name exists.
    pub fn remove_metric(&mut self, name: &str) -> Result<Metric> {
        self.metrics
            .remove(name)
            .ok_or_else(|| CatalogError::MetricNotFound {
                name: name.to_string(),
            })
    }

    /// All metrics, sorted by name.
    pub fn list_metrics(&self) -> Vec<&Metric> {
        let mut metrics: Vec<&Metric> = self.metrics.values().collect();
        metrics.sort_by(|a, b| a.name.cmp(&b.name));
        metrics
    }

    /// Package version this tenant is considered to run for a probe
    /// package, derived from the probe keys of its existing metrics.
    pub fn installed_package_version(
        &self,
        shared: &SharedCatalog,
        package_name: &str,
    ) -> Option<String> {
        let mut versions: Vec<&Metric> = self.metrics.values().collect();
        versions.sort_by(|a, b| a.name.cmp(&b.name));
        for metric in versions {
            if let Some(probekey) = &metric.probekey {
                if let Ok(probe) = shared.get_probe(&probekey.probe) {
                    if probe.package.name == package_name {
                        return Some(probekey.version.clone());
                    }
                }
            }
        }
        None
    }

    /// # Errors
    ///
    /// Returns `ProfileNotFound` if no metric profile with that api id exists.
    pub fn get_metric_profile(&self, apiid: &str) -> Result<&MetricProfile> {
        self.metric_profiles
            .get(apiid)
            .ok_or_else(|| CatalogError::ProfileNotFound {
                apiid: apiid.to_string(),
            })
    }

    pub fn insert_metric_profile(&mut self, profile: MetricProfile) {
        self.metric_profiles.insert(profile.apiid.clone(), profile);
    }

    /// # Errors
    ///
    /// Returns `ProfileNotFound` if no metric profile with that api id exists.
    pub fn remove_metric_profile(&mut self, apiid: &str) -> Result<MetricProfile> {
        self.metric_profiles
            .remove(apiid)
            .ok_or_else(|| CatalogError::ProfileNotFound {
                apiid: apiid.to_string(),
            })
    }

    /// All metric profiles, sorted by name.
    pub fn list_metric_profiles(&self) -> Vec<&MetricProfile> {
        let mut profiles: Vec<&MetricProfile> = self.metric_profiles.values().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    /// # Errors
    ///
    /// Returns `ProfileNotFound` if no aggregation profile with that api id exists.
    pub fn get_aggregation_profile(&self, apiid: &str) -> Result<&AggregationProfile> {
        self.aggregation_profiles
            .get(apiid)
            .ok_or_else(|| CatalogError::ProfileNotFound {
                apiid: apiid.to_string(),
            })
    }

    pub fn insert_aggregation_profile(&mut self, profile: AggregationProfile) {
        self.aggregation_profiles
            .insert(profile.apiid.clone(), profile);
    }

    /// # Errors
    ///
    /// Returns `ProfileNotFound` if no aggregation profile with that api id exists.
    pub fn remove_aggregation_profile(&mut self, apiid: &str) -> Result<AggregationProfile> {
        self.aggregation_profiles
            .remove(apiid)
            .ok_or_else(|| CatalogError::ProfileNotFound {
                apiid: apiid.to_string(),
            })
    }

    /// All aggregation profiles, sorted by name.
    pub fn list_aggregation_profiles(&self) -> Vec<&AggregationProfile> {
        let mut profiles: Vec<&AggregationProfile> = self.aggregation_profiles.values().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }

    /// # Errors
    ///
    /// Returns `ProfileNotFound` if no thresholds profile with that api id exists.
    pub fn get_thresholds_profile(&self, apiid: &str) -> Result<&ThresholdsProfile> {
        self.thresholds_profiles
            .get(apiid)
            .ok_or_else(|| CatalogError::ProfileNotFound {
                apiid: apiid.to_string(),
            })
    }

    pub fn insert_thresholds_profile(&mut self, profile: ThresholdsProfile) {
        self.thresholds_profiles
            .insert(profile.apiid.clone(), profile);
    }

    /// # Errors
    ///
    /// Returns `ProfileNotFound` if no thresholds profile with that api id exists.
    pub fn remove_thresholds_profile(&mut self, apiid: &str) -> Result<ThresholdsProfile> {
        self.thresholds_profiles
            .remove(apiid)
            .ok_or_else(|| CatalogError::ProfileNotFound {
                apiid: apiid.to_string(),
            })
    }

    /// All thresholds profiles, sorted by name.
    pub fn list_thresholds_profiles(&self) -> Vec<&ThresholdsProfile> {
        let mut profiles: Vec<&ThresholdsProfile> = self.thresholds_profiles.values().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        profiles
    }
}

/// The whole catalog: shared templates plus per-tenant stores.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub shared: SharedCatalog,
    tenants: HashMap<String, TenantStore>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tenant (no-op if already present) and return its store.
    pub fn add_tenant(&mut self, ctx: &TenantContext) -> &mut TenantStore {
        self.tenants.entry(ctx.name().to_string()).or_default()
    }

    /// # Errors
    ///
    /// Returns `TenantNotFound` if the tenant is not registered.
    pub fn tenant(&self, ctx: &TenantContext) -> Result<&TenantStore> {
        self.tenants
            .get(ctx.name())
            .ok_or_else(|| CatalogError::TenantNotFound {
                name: ctx.name().to_string(),
            })
    }

    /// # Errors
    ///
    /// Returns `TenantNotFound` if the tenant is not registered.
    pub fn tenant_mut(&mut self, ctx: &TenantContext) -> Result<&mut TenantStore> {
        self.tenants
            .get_mut(ctx.name())
            .ok_or_else(|| CatalogError::TenantNotFound {
                name: ctx.name().to_string(),
            })
    }

    /// Registered tenant names, sorted.
    pub fn tenant_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tenants.keys().cloned().collect();
        names.sort();
        names
    }
}
