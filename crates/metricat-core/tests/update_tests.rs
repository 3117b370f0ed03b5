mod common;

use std::collections::BTreeMap;

use common::{ams_template, install_local_metric, new_catalog, seed_ams_probe};
use metricat_core::errors::{CatalogError, Result};
use metricat_core::model::ProbeKey;
use metricat_core::sync::{import_metrics, update_metric_in_schema, update_metrics, ProfileSync};
use metricat_core::INITIAL_COMMENT;
use metricat_core_types::TenantContext;
use mockall::predicate::eq;

mockall::mock! {
    Sync {}

    impl ProfileSync for Sync {
        fn rename_metric(&mut self, old: &str, new: &str) -> Vec<String>;
        fn metrics_in_profiles(
            &self,
            tenant: &TenantContext,
        ) -> Result<BTreeMap<String, Vec<String>>>;
        fn delete_metrics_from_profile(
            &mut self,
            tenant: &TenantContext,
            profile_apiid: &str,
            metrics: &[String],
        ) -> Result<()>;
    }
}

fn import_ams(catalog: &mut metricat_core::Catalog, ctx: &TenantContext, version: &str) {
    seed_ams_probe(catalog, version);
    catalog.shared.insert_template(ams_template(version));
    let outcome = import_metrics(catalog, ctx, &["argo.AMS-Check".to_string()], "").unwrap();
    assert_eq!(outcome.imported, vec!["argo.AMS-Check"]);
}

// ===== SINGLE-TENANT UPDATES =====

#[test]
fn test_update_from_template_preserves_tenant_config() {
    let (mut catalog, ctx) = new_catalog("test");
    import_ams(&mut catalog, &ctx, "0.1.11");

    // Tenant tuned its own config; the template then changes a parameter.
    catalog
        .tenant_mut(&ctx)
        .unwrap()
        .get_metric_mut("argo.AMS-Check")
        .unwrap()
        .config = vec!["timeout 90".to_string()];
    let mut template = ams_template("0.1.11");
    template.parameter = vec!["--project EGI".to_string(), "--token TOKEN".to_string()];
    catalog.shared.insert_template(template);

    update_metric_in_schema(&mut catalog, &ctx, "argo.AMS-Check", "argo.AMS-Check", "", None)
        .unwrap();

    let metric = catalog
        .tenant(&ctx)
        .unwrap()
        .get_metric("argo.AMS-Check")
        .unwrap();
    assert_eq!(metric.config, vec!["timeout 90"]);
    assert_eq!(
        metric.parameter,
        vec!["--project EGI".to_string(), "--token TOKEN".to_string()]
    );
}

#[test]
fn test_unchanged_probe_key_amends_latest_snapshot() {
    let (mut catalog, ctx) = new_catalog("test");
    import_ams(&mut catalog, &ctx, "0.1.11");

    let mut template = ams_template("0.1.11");
    template.description = "AMS queue check".to_string();
    catalog.shared.insert_template(template);

    update_metric_in_schema(
        &mut catalog,
        &ctx,
        "argo.AMS-Check",
        "argo.AMS-Check",
        "admin",
        None,
    )
    .unwrap();

    let store = catalog.tenant(&ctx).unwrap();
    let metric = store.get_metric("argo.AMS-Check").unwrap();
    assert_eq!(metric.description, "AMS queue check");

    let entity = metric.entity_ref();
    assert_eq!(store.history.count(&entity), 1);
    let latest = store.history.latest(&entity).unwrap();
    // The only snapshot still reads as the initial version.
    assert_eq!(latest.comment, INITIAL_COMMENT);
    assert_eq!(latest.user, "admin");
    assert_eq!(
        latest.fields.get("description").unwrap().as_str(),
        Some("AMS queue check")
    );
}

#[test]
fn test_changed_probe_key_appends_snapshot() {
    let (mut catalog, ctx) = new_catalog("test");
    import_ams(&mut catalog, &ctx, "0.1.7");

    seed_ams_probe(&mut catalog, "0.1.11");
    catalog.shared.insert_template(ams_template("0.1.11"));

    update_metric_in_schema(&mut catalog, &ctx, "argo.AMS-Check", "argo.AMS-Check", "", None)
        .unwrap();

    let store = catalog.tenant(&ctx).unwrap();
    let metric = store.get_metric("argo.AMS-Check").unwrap();
    assert_eq!(metric.probekey, Some(ProbeKey::new("ams-probe", "0.1.11")));

    let entity = metric.entity_ref();
    assert_eq!(store.history.count(&entity), 2);
    assert_eq!(
        store.history.latest(&entity).unwrap().comment,
        r#"[{"changed":{"fields":["probekey"]}}]"#
    );
}

#[test]
fn test_update_from_revision_overwrites_config() {
    let (mut catalog, ctx) = new_catalog("test");
    import_ams(&mut catalog, &ctx, "0.1.11");

    let mut old_values = ams_template("0.1.7");
    old_values.config = vec!["timeout 50".to_string()];
    catalog.shared.add_revision(
        "argo.AMS-Check",
        metricat_core::model::TemplateRevision::new(
            ProbeKey::new("ams-probe", "0.1.7"),
            old_values,
        ),
    );

    update_metric_in_schema(
        &mut catalog,
        &ctx,
        "argo.AMS-Check",
        "argo.AMS-Check",
        "",
        Some(&ProbeKey::new("ams-probe", "0.1.7")),
    )
    .unwrap();

    let store = catalog.tenant(&ctx).unwrap();
    let metric = store.get_metric("argo.AMS-Check").unwrap();
    assert_eq!(metric.config, vec!["timeout 50"]);
    assert_eq!(metric.probekey, Some(ProbeKey::new("ams-probe", "0.1.7")));
    assert_eq!(store.history.count(&metric.entity_ref()), 2);
}

#[test]
fn test_template_rename_onto_existing_metric_is_refused() {
    let (mut catalog, ctx) = new_catalog("test");
    import_ams(&mut catalog, &ctx, "0.1.11");
    install_local_metric(&mut catalog, &ctx, "argo.AMS-Check-new", "0.1.11");

    let mut renamed = ams_template("0.1.11");
    renamed.name = "argo.AMS-Check-new".to_string();
    catalog.shared.insert_template(renamed);

    let result = update_metric_in_schema(
        &mut catalog,
        &ctx,
        "argo.AMS-Check-new",
        "argo.AMS-Check",
        "",
        None,
    );
    assert!(matches!(result, Err(CatalogError::MetricExists { .. })));
    // The losing rename leaves both metrics in place.
    let store = catalog.tenant(&ctx).unwrap();
    assert!(store.metric_exists("argo.AMS-Check"));
    assert!(store.metric_exists("argo.AMS-Check-new"));
}

#[test]
fn test_update_from_unknown_revision_reports_template_not_found() {
    let (mut catalog, ctx) = new_catalog("test");
    import_ams(&mut catalog, &ctx, "0.1.11");

    let result = update_metric_in_schema(
        &mut catalog,
        &ctx,
        "argo.AMS-Check",
        "argo.AMS-Check",
        "",
        Some(&ProbeKey::new("ams-probe", "0.0.1")),
    );
    assert!(matches!(
        result,
        Err(CatalogError::TemplateNotFound { .. })
    ));
}

// ===== FAN-OUT ACROSS TENANTS =====

#[test]
fn test_rename_propagates_to_every_tenant_with_single_sync_call() {
    let (mut catalog, ctx1) = new_catalog("test");
    let ctx2 = TenantContext::new("test2");
    catalog.add_tenant(&ctx2);

    seed_ams_probe(&mut catalog, "0.1.11");
    catalog.shared.insert_template(ams_template("0.1.11"));
    import_metrics(&mut catalog, &ctx1, &["argo.AMS-Check".to_string()], "").unwrap();
    import_metrics(&mut catalog, &ctx2, &["argo.AMS-Check".to_string()], "").unwrap();

    let mut renamed = ams_template("0.1.11");
    renamed.name = "argo.AMS-Check-new".to_string();
    catalog.shared.insert_template(renamed);

    let mut sync = MockSync::new();
    sync.expect_rename_metric()
        .with(eq("argo.AMS-Check"), eq("argo.AMS-Check-new"))
        .times(1)
        .returning(|_, _| Vec::new());

    let warnings =
        update_metrics(&mut catalog, "argo.AMS-Check-new", "argo.AMS-Check", &mut sync, "")
            .unwrap();
    assert!(warnings.is_empty());

    for ctx in [&ctx1, &ctx2] {
        let store = catalog.tenant(ctx).unwrap();
        assert!(store.metric_exists("argo.AMS-Check-new"));
        assert!(!store.metric_exists("argo.AMS-Check"));
    }
}

#[test]
fn test_unchanged_name_never_touches_profiles() {
    let (mut catalog, ctx) = new_catalog("test");
    import_ams(&mut catalog, &ctx, "0.1.11");

    // No expectation set: a rename call would panic the mock.
    let mut sync = MockSync::new();
    let warnings =
        update_metrics(&mut catalog, "argo.AMS-Check", "argo.AMS-Check", &mut sync, "").unwrap();
    assert!(warnings.is_empty());
}

#[test]
fn test_sync_warnings_are_propagated() {
    let (mut catalog, ctx) = new_catalog("test");
    import_ams(&mut catalog, &ctx, "0.1.11");

    let mut renamed = ams_template("0.1.11");
    renamed.name = "argo.AMS-Check-new".to_string();
    catalog.shared.insert_template(renamed);

    let warning =
        "TEST: No \"WEB-API\" key in the DB!\nPlease update metric profiles manually.".to_string();
    let reported = warning.clone();
    let mut sync = MockSync::new();
    sync.expect_rename_metric()
        .times(1)
        .returning(move |_, _| vec![reported.clone()]);

    let warnings =
        update_metrics(&mut catalog, "argo.AMS-Check-new", "argo.AMS-Check", &mut sync, "")
            .unwrap();
    assert_eq!(warnings, vec![warning]);
}

#[test]
fn test_update_metrics_requires_known_template() {
    let (mut catalog, _ctx) = new_catalog("test");
    let mut sync = MockSync::new();
    let result = update_metrics(
        &mut catalog,
        "nonexisting-template",
        "argo.AMS-Check",
        &mut sync,
        "",
    );
    assert!(matches!(
        result,
        Err(CatalogError::TemplateNotFound { .. })
    ));
}

#[test]
fn test_tenant_without_metric_is_skipped() {
    let (mut catalog, ctx1) = new_catalog("test");
    let ctx2 = TenantContext::new("test2");
    catalog.add_tenant(&ctx2);

    seed_ams_probe(&mut catalog, "0.1.11");
    catalog.shared.insert_template(ams_template("0.1.11"));
    import_metrics(&mut catalog, &ctx1, &["argo.AMS-Check".to_string()], "").unwrap();

    let mut sync = MockSync::new();
    let warnings =
        update_metrics(&mut catalog, "argo.AMS-Check", "argo.AMS-Check", &mut sync, "").unwrap();
    assert!(warnings.is_empty());
    assert!(catalog.tenant(&ctx2).unwrap().list_metrics().is_empty());
}
