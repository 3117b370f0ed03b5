//! Seam to the external profile-synchronization collaborator.

use metricat_core_types::TenantContext;
use std::collections::BTreeMap;

use crate::errors::Result;

/// External web API holding the authoritative profile definitions.
///
/// The rename path never fails hard: per-tenant failures degrade to
/// returned warning strings so one tenant cannot abort the others.
/// The query and delete operations are contracted to fail loudly instead.
pub trait ProfileSync {
    /// Rewrite every occurrence of `old` in every profile's service→metric
    /// lists to `new`. Returns collected warning messages; an empty vector
    /// means full success.
    fn rename_metric(&mut self, old: &str, new: &str) -> Vec<String>;

    /// Map each metric name to the names of the profiles containing it.
    ///
    /// # Errors
    ///
    /// `ApiKeyMissing` if no key is configured for the tenant; `WebApi` on
    /// transport or non-2xx failures.
    fn metrics_in_profiles(
        &self,
        tenant: &TenantContext,
    ) -> Result<BTreeMap<String, Vec<String>>>;

    /// Remove the given metrics from one profile, dropping services left
    /// empty, and store the modified profile back.
    ///
    /// # Errors
    ///
    /// `ApiKeyMissing` if no key is configured for the tenant;
    /// `ProfileNotFound` if the profile api id is unknown; `WebApi` on
    /// transport or non-2xx failures.
    fn delete_metrics_from_profile(
        &mut self,
        tenant: &TenantContext,
        profile_apiid: &str,
        metrics: &[String],
    ) -> Result<()>;
}
