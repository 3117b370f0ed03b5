//! Operations over tenant-local profile rows, including reconciliation
//! against the external web API catalog.

use metricat_core_types::TenantContext;
use tracing::{debug, info};

use crate::diff::comment::{create_comment, INITIAL_COMMENT};
use crate::errors::Result;
use crate::model::{AggregationProfile, FieldSchema, MetricProfile, ThresholdsProfile};
use crate::ops::store::Catalog;

/// A profile as fetched from the external web API, reduced to the fields
/// the local store mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedProfile {
    pub apiid: String,
    pub name: String,
    pub description: String,
    /// (service, metric) pairs flattened from the service groups
    pub metricinstances: Vec<(String, String)>,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    /// Names of profiles created locally
    pub created: Vec<String>,
    /// Names of profiles deleted locally
    pub deleted: Vec<String>,
}

/// Create a metric profile row and its initial version snapshot.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
pub fn create_metric_profile(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    profile: MetricProfile,
    user: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let entity = profile.entity_ref();
    let fields = profile.serialize_fields();
    debug!(tenant = %ctx, profile = %profile.name, "creating metric profile");
    store.insert_metric_profile(profile);
    store.history.record(entity, fields, INITIAL_COMMENT, user);
    Ok(())
}

/// Replace a metric profile's content and append a version snapshot.
///
/// The stored row's id is preserved so history stays attached.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `ProfileNotFound` - If no profile with that api id exists
pub fn update_metric_profile(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    mut updated: MetricProfile,
    user: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let current = store.get_metric_profile(&updated.apiid)?;
    updated.id = current.id.clone();

    let entity = updated.entity_ref();
    let fields = updated.serialize_fields();
    let comment = create_comment(
        &FieldSchema::metric_profile(),
        &store.history,
        &entity,
        &fields,
    );
    debug!(tenant = %ctx, profile = %updated.name, "updating metric profile");
    store.insert_metric_profile(updated);
    store.history.record(entity, fields, comment, user);
    Ok(())
}

/// Delete a metric profile together with all its version snapshots.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `ProfileNotFound` - If no profile with that api id exists
pub fn delete_metric_profile(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    apiid: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let profile = store.remove_metric_profile(apiid)?;
    debug!(tenant = %ctx, profile = %profile.name, "deleting metric profile with history");
    store.history.delete_for(&profile.entity_ref());
    Ok(())
}

/// Reconcile the tenant's metric profile rows against the web API catalog.
///
/// Profiles present in the fetched catalog but not locally are created with
/// an initial snapshot; local profiles absent from the catalog are deleted
/// together with their history; profiles present on both sides adopt the
/// fetched name and description (renames tracked by api id, no snapshot
/// written).
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
pub fn sync_profiles(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    fetched: &[FetchedProfile],
    user: &str,
) -> Result<SyncResult> {
    let mut result = SyncResult::default();

    let local_apiids: Vec<String> = catalog
        .tenant(ctx)?
        .list_metric_profiles()
        .iter()
        .map(|p| p.apiid.clone())
        .collect();

    for doc in fetched {
        if local_apiids.contains(&doc.apiid) {
            let store = catalog.tenant_mut(ctx)?;
            let current = store.get_metric_profile(&doc.apiid)?;
            if current.name != doc.name || current.description != doc.description {
                let mut adopted = current.clone();
                adopted.name = doc.name.clone();
                adopted.description = doc.description.clone();
                store.insert_metric_profile(adopted);
            }
        } else {
            let mut profile = MetricProfile::new(&doc.apiid, &doc.name);
            profile.description = doc.description.clone();
            profile.metricinstances = doc.metricinstances.clone();
            result.created.push(profile.name.clone());
            create_metric_profile(catalog, ctx, profile, user)?;
        }
    }

    for apiid in &local_apiids {
        if !fetched.iter().any(|doc| &doc.apiid == apiid) {
            let name = catalog.tenant(ctx)?.get_metric_profile(apiid)?.name.clone();
            delete_metric_profile(catalog, ctx, apiid)?;
            result.deleted.push(name);
        }
    }

    info!(
        tenant = %ctx,
        created = result.created.len(),
        deleted = result.deleted.len(),
        "profile reconciliation finished"
    );
    Ok(result)
}

/// Create an aggregation profile row and its initial version snapshot.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
pub fn create_aggregation_profile(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    profile: AggregationProfile,
    user: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let entity = profile.entity_ref();
    let fields = profile.serialize_fields();
    debug!(tenant = %ctx, profile = %profile.name, "creating aggregation profile");
    store.insert_aggregation_profile(profile);
    store.history.record(entity, fields, INITIAL_COMMENT, user);
    Ok(())
}

/// Replace an aggregation profile's content and append a version snapshot.
///
/// The stored row's id is preserved so history stays attached.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `ProfileNotFound` - If no profile with that api id exists
pub fn update_aggregation_profile(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    mut updated: AggregationProfile,
    user: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let current = store.get_aggregation_profile(&updated.apiid)?;
    updated.id = current.id.clone();

    let entity = updated.entity_ref();
    let fields = updated.serialize_fields();
    let comment = create_comment(
        &FieldSchema::aggregation_profile(),
        &store.history,
        &entity,
        &fields,
    );
    debug!(tenant = %ctx, profile = %updated.name, "updating aggregation profile");
    store.insert_aggregation_profile(updated);
    store.history.record(entity, fields, comment, user);
    Ok(())
}

/// Delete an aggregation profile together with all its version snapshots.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `ProfileNotFound` - If no profile with that api id exists
pub fn delete_aggregation_profile(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    apiid: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let profile = store.remove_aggregation_profile(apiid)?;
    debug!(tenant = %ctx, profile = %profile.name, "deleting aggregation profile with history");
    store.history.delete_for(&profile.entity_ref());
    Ok(())
}

/// Reconcile the tenant's aggregation profile rows against the web API
/// catalog. Same contract as [`sync_profiles`]: create missing rows with an
/// initial snapshot, delete absent rows with their history, adopt renames by
/// api id without a snapshot.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
pub fn sync_aggregation_profiles(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    fetched: &[AggregationProfile],
    user: &str,
) -> Result<SyncResult> {
    let mut result = SyncResult::default();

    let local_apiids: Vec<String> = catalog
        .tenant(ctx)?
        .list_aggregation_profiles()
        .iter()
        .map(|p| p.apiid.clone())
        .collect();

    for doc in fetched {
        if local_apiids.contains(&doc.apiid) {
            let store = catalog.tenant_mut(ctx)?;
            let current = store.get_aggregation_profile(&doc.apiid)?;
            if current.name != doc.name {
                let mut adopted = current.clone();
                adopted.name = doc.name.clone();
                store.insert_aggregation_profile(adopted);
            }
        } else {
            result.created.push(doc.name.clone());
            create_aggregation_profile(catalog, ctx, doc.clone(), user)?;
        }
    }

    for apiid in &local_apiids {
        if !fetched.iter().any(|doc| &doc.apiid == apiid) {
            let name = catalog
                .tenant(ctx)?
                .get_aggregation_profile(apiid)?
                .name
                .clone();
            delete_aggregation_profile(catalog, ctx, apiid)?;
            result.deleted.push(name);
        }
    }

    info!(
        tenant = %ctx,
        created = result.created.len(),
        deleted = result.deleted.len(),
        "aggregation reconciliation finished"
    );
    Ok(result)
}

/// Create a thresholds profile row and its initial version snapshot.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
pub fn create_thresholds_profile(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    profile: ThresholdsProfile,
    user: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let entity = profile.entity_ref();
    let fields = profile.serialize_fields();
    debug!(tenant = %ctx, profile = %profile.name, "creating thresholds profile");
    store.insert_thresholds_profile(profile);
    store.history.record(entity, fields, INITIAL_COMMENT, user);
    Ok(())
}

/// Replace a thresholds profile's content and append a version snapshot.
///
/// The stored row's id is preserved so history stays attached.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `ProfileNotFound` - If no profile with that api id exists
pub fn update_thresholds_profile(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    mut updated: ThresholdsProfile,
    user: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let current = store.get_thresholds_profile(&updated.apiid)?;
    updated.id = current.id.clone();

    let entity = updated.entity_ref();
    let fields = updated.serialize_fields();
    let comment = create_comment(
        &FieldSchema::thresholds_profile(),
        &store.history,
        &entity,
        &fields,
    );
    debug!(tenant = %ctx, profile = %updated.name, "updating thresholds profile");
    store.insert_thresholds_profile(updated);
    store.history.record(entity, fields, comment, user);
    Ok(())
}

/// Delete a thresholds profile together with all its version snapshots.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `ProfileNotFound` - If no profile with that api id exists
pub fn delete_thresholds_profile(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    apiid: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let profile = store.remove_thresholds_profile(apiid)?;
    debug!(tenant = %ctx, profile = %profile.name, "deleting thresholds profile with history");
    store.history.delete_for(&profile.entity_ref());
    Ok(())
}

/// Reconcile the tenant's thresholds profile rows against the web API
/// catalog. Same contract as [`sync_profiles`]: create missing rows with an
/// initial snapshot, delete absent rows with their history, adopt renames by
/// api id without a snapshot.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
pub fn sync_thresholds_profiles(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    fetched: &[ThresholdsProfile],
    user: &str,
) -> Result<SyncResult> {
    let mut result = SyncResult::default();

    let local_apiids: Vec<String> = catalog
        .tenant(ctx)?
        .list_thresholds_profiles()
        .iter()
        .map(|p| p.apiid.clone())
        .collect();

    for doc in fetched {
        if local_apiids.contains(&doc.apiid) {
            let store = catalog.tenant_mut(ctx)?;
            let current = store.get_thresholds_profile(&doc.apiid)?;
            if current.name != doc.name {
                let mut adopted = current.clone();
                adopted.name = doc.name.clone();
                store.insert_thresholds_profile(adopted);
            }
        } else {
            result.created.push(doc.name.clone());
            create_thresholds_profile(catalog, ctx, doc.clone(), user)?;
        }
    }

    for apiid in &local_apiids {
        if !fetched.iter().any(|doc| &doc.apiid == apiid) {
            let name = catalog
                .tenant(ctx)?
                .get_thresholds_profile(apiid)?
                .name
                .clone();
            delete_thresholds_profile(catalog, ctx, apiid)?;
            result.deleted.push(name);
        }
    }

    info!(
        tenant = %ctx,
        created = result.created.len(),
        deleted = result.deleted.len(),
        "thresholds reconciliation finished"
    );
    Ok(result)
}
