//! CRUD operations over tenant-local metrics.
//!
//! Every mutation writes its version snapshot atomically with the field
//! update (single-threaded store, no partial states observable).

use metricat_core_types::TenantContext;
use tracing::debug;

use crate::diff::comment::{create_comment, INITIAL_COMMENT};
use crate::errors::{CatalogError, Result};
use crate::model::{FieldSchema, Metric};
use crate::ops::store::Catalog;

/// Create a new local metric and its initial version snapshot.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `MetricExists` - If a metric with that name already exists
pub fn create_metric(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    metric: Metric,
    user: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    if store.metric_exists(&metric.name) {
        return Err(CatalogError::MetricExists {
            name: metric.name.clone(),
        });
    }

    let entity = metric.entity_ref();
    let fields = metric.serialize_fields();
    debug!(tenant = %ctx, metric = %metric.name, "creating metric");

    store.insert_metric(metric);
    store.history.record(entity, fields, INITIAL_COMMENT, user);
    Ok(())
}

/// Replace a metric's field values and append a version snapshot.
///
/// The updated metric keeps the stored row's id so history stays attached;
/// a rename re-keys the store entry. The snapshot comment is computed by
/// diffing against the latest snapshot.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `MetricNotFound` - If no metric named `name` exists
/// * `MetricExists` - If renaming onto an already-taken name
pub fn update_metric(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    name: &str,
    mut updated: Metric,
    user: &str,
) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let current = store.get_metric(name)?;
    updated.id = current.id.clone();

    if updated.name != name && store.metric_exists(&updated.name) {
        return Err(CatalogError::MetricExists {
            name: updated.name.clone(),
        });
    }

    let entity = updated.entity_ref();
    let fields = updated.serialize_fields();
    let comment = create_comment(&FieldSchema::metric(), &store.history, &entity, &fields);
    debug!(tenant = %ctx, metric = %name, new_name = %updated.name, "updating metric");

    store.remove_metric(name)?;
    store.insert_metric(updated);
    store.history.record(entity, fields, comment, user);
    Ok(())
}

/// Delete a metric together with all its version snapshots.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `MetricNotFound` - If no metric named `name` exists
pub fn delete_metric(catalog: &mut Catalog, ctx: &TenantContext, name: &str) -> Result<()> {
    let store = catalog.tenant_mut(ctx)?;
    let metric = store.remove_metric(name)?;
    debug!(tenant = %ctx, metric = %name, "deleting metric with history");
    store.history.delete_for(&metric.entity_ref());
    Ok(())
}

/// List the tenant's metrics sorted by name.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
pub fn list_metrics<'a>(catalog: &'a Catalog, ctx: &TenantContext) -> Result<Vec<&'a Metric>> {
    Ok(catalog.tenant(ctx)?.list_metrics())
}
