//! CRUD operations over the shared catalog: probes and metric templates.
//!
//! Shared entities version into the shared history log. A template update
//! that moves the probe key archives the outgoing field values as a
//! [`TemplateRevision`] pinned at the old key, so tenants running the older
//! package can still import the template as it was.

use tracing::debug;

use crate::diff::comment::{create_comment, INITIAL_COMMENT};
use crate::errors::{CatalogError, Result};
use crate::model::{FieldSchema, MetricTemplate, Probe, TemplateRevision};
use crate::ops::store::Catalog;

/// Register a probe and its initial version snapshot.
///
/// # Errors
/// * `ProbeExists` - If a probe with that name already exists
pub fn create_probe(catalog: &mut Catalog, probe: Probe, user: &str) -> Result<()> {
    let shared = &mut catalog.shared;
    if shared.probe_exists(&probe.name) {
        return Err(CatalogError::ProbeExists {
            name: probe.name.clone(),
        });
    }

    let entity = probe.entity_ref();
    let fields = probe.serialize_fields();
    debug!(probe = %probe.name, "creating probe");
    shared.insert_probe(probe);
    shared.history.record(entity, fields, INITIAL_COMMENT, user);
    Ok(())
}

/// Replace a probe's field values and append a version snapshot.
///
/// The stored row's id is preserved; a rename re-keys the store entry.
///
/// # Errors
/// * `ProbeNotFound` - If no probe named `name` exists
/// * `ProbeExists` - If renaming onto an already-taken name
pub fn update_probe(
    catalog: &mut Catalog,
    name: &str,
    mut updated: Probe,
    user: &str,
) -> Result<()> {
    let shared = &mut catalog.shared;
    let current = shared.get_probe(name)?;
    updated.id = current.id.clone();

    if updated.name != name && shared.probe_exists(&updated.name) {
        return Err(CatalogError::ProbeExists {
            name: updated.name.clone(),
        });
    }

    let entity = updated.entity_ref();
    let fields = updated.serialize_fields();
    let comment = create_comment(&FieldSchema::probe(), &shared.history, &entity, &fields);
    debug!(probe = %name, new_name = %updated.name, "updating probe");

    shared.remove_probe(name)?;
    shared.insert_probe(updated);
    shared.history.record(entity, fields, comment, user);
    Ok(())
}

/// Delete a probe together with all its version snapshots.
///
/// # Errors
/// * `ProbeNotFound` - If no probe named `name` exists
pub fn delete_probe(catalog: &mut Catalog, name: &str) -> Result<()> {
    let shared = &mut catalog.shared;
    let probe = shared.remove_probe(name)?;
    debug!(probe = %name, "deleting probe with history");
    shared.history.delete_for(&probe.entity_ref());
    Ok(())
}

/// Register a metric template and its initial version snapshot.
///
/// # Errors
/// * `TemplateExists` - If a template with that name already exists
pub fn create_metric_template(
    catalog: &mut Catalog,
    template: MetricTemplate,
    user: &str,
) -> Result<()> {
    let shared = &mut catalog.shared;
    if shared.template_exists(&template.name) {
        return Err(CatalogError::TemplateExists {
            name: template.name.clone(),
        });
    }

    let entity = template.entity_ref();
    let fields = template.serialize_fields();
    debug!(template = %template.name, "creating metric template");
    shared.insert_template(template);
    shared.history.record(entity, fields, INITIAL_COMMENT, user);
    Ok(())
}

/// Replace a template's field values and append a version snapshot.
///
/// If the probe key moves, the outgoing values are archived as a revision
/// pinned at the old key before the new values land. The stored row's id is
/// preserved; a rename re-keys both the template and its revision archive.
///
/// # Errors
/// * `TemplateNotFound` - If no template named `name` exists
/// * `TemplateExists` - If renaming onto an already-taken name
pub fn update_metric_template(
    catalog: &mut Catalog,
    name: &str,
    mut updated: MetricTemplate,
    user: &str,
) -> Result<()> {
    let shared = &mut catalog.shared;
    let current = shared.get_template(name)?.clone();
    updated.id = current.id.clone();

    if updated.name != name && shared.template_exists(&updated.name) {
        return Err(CatalogError::TemplateExists {
            name: updated.name.clone(),
        });
    }

    if let Some(old_key) = &current.probekey {
        if current.probekey != updated.probekey {
            debug!(
                template = %name, version = %old_key.version,
                "archiving template revision"
            );
            shared.add_revision(name, TemplateRevision::new(old_key.clone(), current.clone()));
        }
    }

    let entity = updated.entity_ref();
    let fields = updated.serialize_fields();
    let comment = create_comment(&FieldSchema::metric(), &shared.history, &entity, &fields);
    debug!(template = %name, new_name = %updated.name, "updating metric template");

    let new_name = updated.name.clone();
    shared.remove_template(name)?;
    shared.insert_template(updated);
    if new_name != name {
        shared.rename_revisions(name, &new_name);
    }
    shared.history.record(entity, fields, comment, user);
    Ok(())
}

/// Delete a template together with its snapshots and revision archive.
///
/// # Errors
/// * `TemplateNotFound` - If no template named `name` exists
pub fn delete_metric_template(catalog: &mut Catalog, name: &str) -> Result<()> {
    let shared = &mut catalog.shared;
    let template = shared.remove_template(name)?;
    debug!(template = %name, "deleting metric template with history");
    shared.history.delete_for(&template.entity_ref());
    shared.delete_revisions(name);
    Ok(())
}
