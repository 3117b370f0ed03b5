mod common;

use common::{ams_template, install_local_metric, new_catalog, seed_ams_probe};
use metricat_core::model::{MetricTemplate, ProbeKey, TemplateRevision};
use metricat_core::sync::import_metrics;
use metricat_core::INITIAL_COMMENT;

// ===== SUCCESS =====

#[test]
fn test_clean_import_creates_metric_and_initial_snapshot() {
    let (mut catalog, ctx) = new_catalog("test");
    seed_ams_probe(&mut catalog, "0.1.11");
    catalog.shared.insert_template(ams_template("0.1.11"));

    let outcome = import_metrics(
        &mut catalog,
        &ctx,
        &["argo.AMS-Check".to_string()],
        "importer",
    )
    .unwrap();

    assert_eq!(outcome.imported, vec!["argo.AMS-Check"]);
    assert!(outcome.warnings.is_empty());
    assert!(outcome.errors.is_empty());
    assert!(outcome.unavailable.is_empty());

    let store = catalog.tenant(&ctx).unwrap();
    let metric = store.get_metric("argo.AMS-Check").unwrap();
    assert_eq!(metric.group, "TEST");
    assert_eq!(metric.probekey, Some(ProbeKey::new("ams-probe", "0.1.11")));
    assert!(metric.tags.contains("test_tag1"));

    let entity = metric.entity_ref();
    assert_eq!(store.history.count(&entity), 1);
    assert_eq!(
        store.history.latest(&entity).unwrap().comment,
        INITIAL_COMMENT
    );
    assert_eq!(store.history.latest(&entity).unwrap().user, "importer");
}

#[test]
fn test_passive_template_imports_without_probe_key() {
    let (mut catalog, ctx) = new_catalog("test");
    let mut template = MetricTemplate::passive("org.apel.APEL-Pub");
    template.flags = vec!["OBSESS 1".to_string(), "PASSIVE 1".to_string()];
    catalog.shared.insert_template(template);

    let outcome = import_metrics(&mut catalog, &ctx, &["org.apel.APEL-Pub".to_string()], "")
        .unwrap();

    assert_eq!(outcome.imported, vec!["org.apel.APEL-Pub"]);
    let metric = catalog
        .tenant(&ctx)
        .unwrap()
        .get_metric("org.apel.APEL-Pub")
        .unwrap();
    assert_eq!(metric.probekey, None);
}

#[test]
fn test_tenant_older_than_pinned_without_revision_imports_current() {
    let (mut catalog, ctx) = new_catalog("test");
    seed_ams_probe(&mut catalog, "0.1.11");
    catalog.shared.insert_template(ams_template("0.1.11"));
    install_local_metric(&mut catalog, &ctx, "argo.AMS-Publisher", "0.1.7");

    let outcome = import_metrics(
        &mut catalog,
        &ctx,
        &["argo.AMS-Check".to_string()],
        "",
    )
    .unwrap();

    assert_eq!(outcome.imported, vec!["argo.AMS-Check"]);
    let metric = catalog
        .tenant(&ctx)
        .unwrap()
        .get_metric("argo.AMS-Check")
        .unwrap();
    assert_eq!(metric.probekey, Some(ProbeKey::new("ams-probe", "0.1.11")));
}

// ===== WARNING =====

#[test]
fn test_matching_revision_imports_historical_values() {
    let (mut catalog, ctx) = new_catalog("test");
    seed_ams_probe(&mut catalog, "0.1.11");
    catalog.shared.insert_template(ams_template("0.1.11"));

    let mut old_values = ams_template("0.1.7");
    old_values.config = vec!["timeout 50".to_string()];
    catalog.shared.add_revision(
        "argo.AMS-Check",
        TemplateRevision::new(ProbeKey::new("ams-probe", "0.1.7"), old_values),
    );

    install_local_metric(&mut catalog, &ctx, "argo.AMS-Publisher", "0.1.7");

    let outcome = import_metrics(
        &mut catalog,
        &ctx,
        &["argo.AMS-Check".to_string()],
        "",
    )
    .unwrap();

    assert!(outcome.imported.is_empty());
    assert_eq!(outcome.warnings, vec!["argo.AMS-Check"]);

    let metric = catalog
        .tenant(&ctx)
        .unwrap()
        .get_metric("argo.AMS-Check")
        .unwrap();
    assert_eq!(metric.config, vec!["timeout 50"]);
    assert_eq!(metric.probekey, Some(ProbeKey::new("ams-probe", "0.1.7")));
}

// ===== ERROR =====

#[test]
fn test_existing_metric_classifies_error_and_writes_nothing() {
    let (mut catalog, ctx) = new_catalog("test");
    seed_ams_probe(&mut catalog, "0.1.11");
    catalog.shared.insert_template(ams_template("0.1.11"));
    install_local_metric(&mut catalog, &ctx, "argo.AMS-Check", "0.1.7");

    let before = catalog
        .tenant(&ctx)
        .unwrap()
        .get_metric("argo.AMS-Check")
        .unwrap()
        .clone();

    let outcome = import_metrics(
        &mut catalog,
        &ctx,
        &["argo.AMS-Check".to_string()],
        "",
    )
    .unwrap();

    assert_eq!(outcome.errors, vec!["argo.AMS-Check"]);
    assert!(outcome.imported.is_empty());

    let store = catalog.tenant(&ctx).unwrap();
    let after = store.get_metric("argo.AMS-Check").unwrap();
    assert_eq!(after, &before);
    assert_eq!(store.history.count(&after.entity_ref()), 0);
}

// ===== UNAVAILABLE =====

#[test]
fn test_unknown_template_classifies_unavailable() {
    let (mut catalog, ctx) = new_catalog("test");

    let outcome = import_metrics(
        &mut catalog,
        &ctx,
        &["nonexisting-metric".to_string()],
        "",
    )
    .unwrap();

    assert_eq!(outcome.unavailable, vec!["nonexisting-metric"]);
    assert!(catalog.tenant(&ctx).unwrap().list_metrics().is_empty());
}

#[test]
fn test_downgrade_classifies_unavailable_and_writes_nothing() {
    let (mut catalog, ctx) = new_catalog("test");
    seed_ams_probe(&mut catalog, "0.1.11");
    // Template pinned at an older package version than the tenant runs.
    catalog.shared.insert_template(ams_template("0.1.7"));
    install_local_metric(&mut catalog, &ctx, "argo.AMS-Publisher", "0.1.11");

    let outcome = import_metrics(
        &mut catalog,
        &ctx,
        &["argo.AMS-Check".to_string()],
        "",
    )
    .unwrap();

    assert_eq!(outcome.unavailable, vec!["argo.AMS-Check"]);
    assert!(!catalog.tenant(&ctx).unwrap().metric_exists("argo.AMS-Check"));
}

// ===== BUCKETS =====

#[test]
fn test_buckets_are_disjoint_and_order_preserving() {
    let (mut catalog, ctx) = new_catalog("test");
    seed_ams_probe(&mut catalog, "0.1.11");
    catalog.shared.insert_template(ams_template("0.1.11"));
    let mut second = ams_template("0.1.11");
    second.name = "argo.AMS-Publisher".to_string();
    catalog.shared.insert_template(second);
    install_local_metric(&mut catalog, &ctx, "argo.AMS-Publisher", "0.1.11");

    let names = vec![
        "argo.AMS-Check".to_string(),
        "argo.AMS-Publisher".to_string(),
        "nonexisting-metric".to_string(),
    ];
    let outcome = import_metrics(&mut catalog, &ctx, &names, "").unwrap();

    assert_eq!(outcome.imported, vec!["argo.AMS-Check"]);
    assert_eq!(outcome.errors, vec!["argo.AMS-Publisher"]);
    assert_eq!(outcome.unavailable, vec!["nonexisting-metric"]);
    assert!(outcome.warnings.is_empty());
}
