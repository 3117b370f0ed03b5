use metricat_core::model::{Metric, MetricTemplate, Package, Probe, ProbeKey};
use metricat_core::ops::Catalog;
use metricat_core_types::TenantContext;

/// Create a catalog with one registered tenant.
#[allow(dead_code)]
pub fn new_catalog(tenant: &str) -> (Catalog, TenantContext) {
    let mut catalog = Catalog::new();
    let ctx = TenantContext::new(tenant);
    catalog.add_tenant(&ctx);
    (catalog, ctx)
}

/// Register the `ams-probe` probe shipping in `nagios-plugins-argo` at the
/// given version.
#[allow(dead_code)]
pub fn seed_ams_probe(catalog: &mut Catalog, version: &str) {
    catalog.shared.insert_probe(Probe::new(
        "ams-probe",
        Package::new("nagios-plugins-argo", version),
    ));
}

/// A realistic active template pinned at the given package version.
#[allow(dead_code)]
pub fn ams_template(version: &str) -> MetricTemplate {
    let mut template =
        MetricTemplate::active("argo.AMS-Check", ProbeKey::new("ams-probe", version));
    template.probeexecutable = "ams-probe".to_string();
    template.config = vec![
        "maxCheckAttempts 3".to_string(),
        "timeout 60".to_string(),
        "interval 5".to_string(),
        "retryInterval 3".to_string(),
    ];
    template.parameter = vec!["--project EGI".to_string()];
    template.flags = vec!["OBSESS 1".to_string()];
    template.tags.insert("test_tag1".to_string());
    template
}

/// Install a metric directly into the tenant store, bypassing the import
/// engine, so tests can pin the tenant's installed package version.
#[allow(dead_code)]
pub fn install_local_metric(
    catalog: &mut Catalog,
    ctx: &TenantContext,
    name: &str,
    probe_version: &str,
) {
    let mut template = ams_template(probe_version);
    template.name = name.to_string();
    let metric = Metric::from_template(&template, ctx.default_group());
    catalog.tenant_mut(ctx).unwrap().insert_metric(metric);
}
