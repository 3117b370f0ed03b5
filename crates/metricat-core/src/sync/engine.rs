//! Metric import and template-update propagation.
//!
//! Reconciles a tenant's local metric catalog against the shared template
//! catalog. Imports classify each requested template name into one of four
//! mutually-exclusive buckets; template updates fan out across tenants,
//! collecting failures as warnings instead of aborting.

use metricat_core_types::TenantContext;
use tracing::{debug, info, warn};

use crate::diff::comment::{create_comment, update_comment, INITIAL_COMMENT};
use crate::errors::{CatalogError, Result};
use crate::model::{FieldSchema, Metric, MetricTemplate, ProbeKey};
use crate::ops::store::Catalog;
use crate::sync::profiles::ProfileSync;

/// Per-name classification of one import run. Buckets are disjoint and
/// preserve request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Cleanly imported from the current template
    pub imported: Vec<String>,
    /// Imported from a historical revision matching the tenant's installed
    /// package version
    pub warnings: Vec<String>,
    /// Skipped: a local metric with the same name already exists
    pub errors: Vec<String>,
    /// Refused: template unknown, or importing would downgrade the tenant
    pub unavailable: Vec<String>,
}

/// True if `a` is a strictly newer version than `b`.
///
/// Non-semver versions cannot be ordered and compare as not-newer.
fn is_newer(a: &str, b: &str) -> bool {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a), Ok(b)) => a > b,
        _ => false,
    }
}

/// Insert a metric built from template values and write its initial
/// snapshot.
fn install_metric(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    values: &MetricTemplate,
    user: &str,
) -> Result<()> {
    let metric = Metric::from_template(values, ctx.default_group());
    let entity = metric.entity_ref();
    let fields = metric.serialize_fields();
    let store = catalog.tenant_mut(ctx)?;
    store.insert_metric(metric);
    store.history.record(entity, fields, INITIAL_COMMENT, user);
    Ok(())
}

/// Import the named templates into a tenant's catalog.
///
/// Classification per name:
/// * `unavailable` - template absent from the shared catalog, or the
///   tenant's installed package version is newer than the template's pinned
///   version with no matching historical revision (downgrade refused,
///   nothing written);
/// * `errors` - a local metric with the same name exists (nothing written);
/// * `warnings` - imported from the historical revision matching the
///   tenant's installed version;
/// * `imported` - imported from the current template. A tenant with no
///   installed version for the probe's package imports the current
///   template.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
pub fn import_metrics(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    names: &[String],
    user: &str,
) -> Result<ImportOutcome> {
    let mut outcome = ImportOutcome::default();

    for name in names {
        let template = match catalog.shared.get_template(name) {
            Ok(template) => template.clone(),
            Err(_) => {
                debug!(tenant = %ctx, metric = %name, "template not in shared catalog");
                outcome.unavailable.push(name.clone());
                continue;
            }
        };

        if catalog.tenant(ctx)?.metric_exists(name) {
            debug!(tenant = %ctx, metric = %name, "local metric already exists");
            outcome.errors.push(name.clone());
            continue;
        }

        let Some(pinned) = template.probekey.clone() else {
            // Passive metrics carry no probe key and always import cleanly.
            install_metric(catalog, ctx, &template, user)?;
            outcome.imported.push(name.clone());
            continue;
        };

        let package_name = catalog
            .shared
            .get_probe(&pinned.probe)
            .ok()
            .map(|probe| probe.package.name.clone());
        let installed = package_name.and_then(|pkg| {
            catalog
                .tenant(ctx)
                .ok()?
                .installed_package_version(&catalog.shared, &pkg)
        });

        match installed {
            None => {
                install_metric(catalog, ctx, &template, user)?;
                outcome.imported.push(name.clone());
            }
            Some(version) if version == pinned.version => {
                install_metric(catalog, ctx, &template, user)?;
                outcome.imported.push(name.clone());
            }
            Some(version) => {
                let revision = catalog
                    .shared
                    .revisions(name)
                    .iter()
                    .find(|r| r.probekey.version == version)
                    .cloned();
                if let Some(revision) = revision {
                    let mut values = revision.values.clone();
                    values.probekey = Some(revision.probekey.clone());
                    install_metric(catalog, ctx, &values, user)?;
                    warn!(
                        tenant = %ctx, metric = %name, version = %version,
                        "imported historical template revision"
                    );
                    outcome.warnings.push(name.clone());
                } else if is_newer(&version, &pinned.version) {
                    warn!(
                        tenant = %ctx, metric = %name,
                        installed = %version, pinned = %pinned.version,
                        "import refused: would downgrade"
                    );
                    outcome.unavailable.push(name.clone());
                } else {
                    install_metric(catalog, ctx, &template, user)?;
                    outcome.imported.push(name.clone());
                }
            }
        }
    }

    info!(
        tenant = %ctx,
        imported = outcome.imported.len(),
        warnings = outcome.warnings.len(),
        errors = outcome.errors.len(),
        unavailable = outcome.unavailable.len(),
        "import finished"
    );
    Ok(outcome)
}

/// Apply a template's field values to one tenant's local metric.
///
/// From the current template (`from_revision: None`) every field except
/// `config` is copied; the tenant keeps its own config. From a historical
/// revision the revision's config is copied too. Snapshot policy: updates
/// from a revision, and updates that change the probe key, append a new
/// snapshot; an update with an unchanged probe key amends the latest
/// snapshot in place.
///
/// # Errors
/// * `TenantNotFound` - If the tenant is not registered
/// * `TemplateNotFound` - If the template (or requested revision) is absent
/// * `MetricNotFound` - If the tenant holds no metric named `old_name`
/// * `MetricExists` - If a template rename collides with another local metric
pub fn update_metric_in_schema(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    template_name: &str,
    old_name: &str,
    user: &str,
    from_revision: Option<&ProbeKey>,
) -> Result<()> {
    let values: MetricTemplate = match from_revision {
        None => catalog.shared.get_template(template_name)?.clone(),
        Some(key) => {
            let revision = catalog
                .shared
                .revisions(template_name)
                .iter()
                .find(|r| &r.probekey == key)
                .ok_or_else(|| CatalogError::TemplateNotFound {
                    name: format!("{} [{}]", template_name, key.version),
                })?;
            let mut values = revision.values.clone();
            values.probekey = Some(revision.probekey.clone());
            values
        }
    };

    let store = catalog.tenant_mut(ctx)?;
    let mut metric = store.get_metric(old_name)?.clone();
    let old_probekey = metric.probekey.clone();

    if from_revision.is_some() {
        metric.apply_template_with_config(&values);
    } else {
        metric.apply_template(&values);
    }

    if metric.name != old_name && store.metric_exists(&metric.name) {
        return Err(CatalogError::MetricExists {
            name: metric.name.clone(),
        });
    }

    let entity = metric.entity_ref();
    let fields = metric.serialize_fields();
    let schema = FieldSchema::metric();
    let append = from_revision.is_some()
        || old_probekey != metric.probekey
        || store.history.latest(&entity).is_none();

    debug!(
        tenant = %ctx, metric = %old_name, new_name = %metric.name, append,
        "applying template update"
    );

    if append {
        let comment = create_comment(&schema, &store.history, &entity, &fields);
        store.remove_metric(old_name)?;
        store.insert_metric(metric);
        store.history.record(entity, fields, comment, user);
    } else {
        let comment = update_comment(&schema, &store.history, &entity, &fields);
        store.remove_metric(old_name)?;
        store.insert_metric(metric);
        store.history.amend_latest(&entity, fields, comment, user)?;
    }
    Ok(())
}

/// Fan a template update out to every tenant holding the metric.
///
/// Tenants are visited sequentially; a failing tenant contributes a warning
/// string and does not disturb the others. If the template's name differs
/// from `old_name`, the profile-sync collaborator's rename is invoked
/// exactly once for the (old, new) pair, independent of tenant count.
///
/// # Errors
/// * `TemplateNotFound` - If the template is absent from the shared catalog
pub fn update_metrics(
    catalog: &mut Catalog,
    template_name: &str,
    old_name: &str,
    sync: &mut dyn ProfileSync,
    user: &str,
) -> Result<Vec<String>> {
    let new_name = catalog.shared.get_template(template_name)?.name.clone();
    let mut warnings = Vec::new();

    for tenant in catalog.tenant_names() {
        let ctx = TenantContext::new(&tenant);
        let holds_metric = catalog
            .tenant(&ctx)
            .map(|store| store.metric_exists(old_name))
            .unwrap_or(false);
        if !holds_metric {
            continue;
        }
        if let Err(err) =
            update_metric_in_schema(catalog, &ctx, template_name, old_name, user, None)
        {
            warn!(tenant = %ctx, metric = %old_name, error = %err, "tenant update failed");
            warnings.push(format!(
                "{}: Error updating metric {}: {}",
                ctx.default_group(),
                old_name,
                err
            ));
        }
    }

    if new_name != old_name {
        warnings.extend(sync.rename_metric(old_name, &new_name));
    }

    Ok(warnings)
}
