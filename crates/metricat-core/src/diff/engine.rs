//! Field-level delta computation between two serialized entity states.
//!
//! The entry point is [`diff_fields`], which walks the NEW mapping's
//! canonical field list and compares each field according to its
//! [`FieldKind`]. Fields present only in the old mapping are skipped, not
//! reported as deleted; the new side defines the canonical field list.

use crate::model::fields::{
    has_value, inline_map, keyed_rows, name_set, pair_set, FieldKind, FieldMap, FieldSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Kind of change a delta describes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DeltaKind {
    Added,
    Changed,
    Deleted,
}

impl DeltaKind {
    /// Bucket name used in the persisted comment payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeltaKind::Added => "added",
            DeltaKind::Changed => "changed",
            DeltaKind::Deleted => "deleted",
        }
    }
}

/// A single field-level change.
///
/// `objects` is empty for scalar fields; for list-valued fields it holds the
/// affected keys (Inline/NameSet/KeyedRows) or the single (service, metric)
/// pair (PairList, one delta per pair). Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDelta {
    pub field: String,
    pub kind: DeltaKind,
    pub objects: Vec<String>,
}

impl FieldDelta {
    fn scalar(field: &str, kind: DeltaKind) -> Self {
        Self {
            field: field.to_string(),
            kind,
            objects: Vec::new(),
        }
    }

    fn keyed(field: &str, kind: DeltaKind, objects: Vec<String>) -> Self {
        Self {
            field: field.to_string(),
            kind,
            objects,
        }
    }
}

/// Compute the key-level delta between two key → value maps.
///
/// Returns `(added, changed, deleted)` key sets, each sorted.
fn map_delta(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut added = Vec::new();
    let mut changed = Vec::new();
    let mut deleted = Vec::new();
    for (key, new_value) in new {
        match old.get(key) {
            None => added.push(key.clone()),
            Some(old_value) if old_value != new_value => changed.push(key.clone()),
            Some(_) => {}
        }
    }
    for key in old.keys() {
        if !new.contains_key(key) {
            deleted.push(key.clone());
        }
    }
    (added, changed, deleted)
}

fn diff_scalar(field: &str, old: Option<&Value>, new: &Value, deltas: &mut Vec<FieldDelta>) {
    let old_present = old.is_some_and(has_value);
    let new_present = has_value(new);
    match (old_present, new_present) {
        (false, true) => deltas.push(FieldDelta::scalar(field, DeltaKind::Added)),
        (true, false) => deltas.push(FieldDelta::scalar(field, DeltaKind::Deleted)),
        (true, true) => {
            if old != Some(new) {
                deltas.push(FieldDelta::scalar(field, DeltaKind::Changed));
            }
        }
        (false, false) => {}
    }
}

fn diff_inline(field: &str, old: Option<&Value>, new: &Value, deltas: &mut Vec<FieldDelta>) {
    let old_map = old.map(inline_map).unwrap_or_default();
    let new_map = inline_map(new);
    let (added, changed, deleted) = map_delta(&old_map, &new_map);
    if !added.is_empty() {
        deltas.push(FieldDelta::keyed(field, DeltaKind::Added, added));
    }
    if !changed.is_empty() {
        deltas.push(FieldDelta::keyed(field, DeltaKind::Changed, changed));
    }
    if !deleted.is_empty() {
        deltas.push(FieldDelta::keyed(field, DeltaKind::Deleted, deleted));
    }
}

fn diff_name_set(field: &str, old: Option<&Value>, new: &Value, deltas: &mut Vec<FieldDelta>) {
    let old_set = old.map(name_set).unwrap_or_default();
    let new_set = name_set(new);
    let added: Vec<String> = new_set.difference(&old_set).cloned().collect();
    let deleted: Vec<String> = old_set.difference(&new_set).cloned().collect();
    if !added.is_empty() {
        deltas.push(FieldDelta::keyed(field, DeltaKind::Added, added));
    }
    if !deleted.is_empty() {
        deltas.push(FieldDelta::keyed(field, DeltaKind::Deleted, deleted));
    }
}

fn diff_pairs(field: &str, old: Option<&Value>, new: &Value, deltas: &mut Vec<FieldDelta>) {
    let old_pairs: BTreeSet<(String, String)> = old.map(pair_set).unwrap_or_default();
    let new_pairs = pair_set(new);
    for (service, metric) in new_pairs.difference(&old_pairs) {
        deltas.push(FieldDelta::keyed(
            field,
            DeltaKind::Added,
            vec![service.clone(), metric.clone()],
        ));
    }
    for (service, metric) in old_pairs.difference(&new_pairs) {
        deltas.push(FieldDelta::keyed(
            field,
            DeltaKind::Deleted,
            vec![service.clone(), metric.clone()],
        ));
    }
}

fn diff_keyed_rows(
    field: &str,
    key: &str,
    old: Option<&Value>,
    new: &Value,
    deltas: &mut Vec<FieldDelta>,
) {
    let old_rows = old.map(|v| keyed_rows(v, key)).unwrap_or_default();
    let new_rows = keyed_rows(new, key);
    let mut added = Vec::new();
    let mut changed = Vec::new();
    let mut deleted = Vec::new();
    for (row_key, new_row) in &new_rows {
        match old_rows.get(row_key) {
            None => added.push(row_key.clone()),
            Some(old_row) if old_row != new_row => changed.push(row_key.clone()),
            Some(_) => {}
        }
    }
    for row_key in old_rows.keys() {
        if !new_rows.contains_key(row_key) {
            deleted.push(row_key.clone());
        }
    }
    if !added.is_empty() {
        deltas.push(FieldDelta::keyed(field, DeltaKind::Added, added));
    }
    if !changed.is_empty() {
        deltas.push(FieldDelta::keyed(field, DeltaKind::Changed, changed));
    }
    if !deleted.is_empty() {
        deltas.push(FieldDelta::keyed(field, DeltaKind::Deleted, deleted));
    }
}

/// Compute field-level deltas between two serialized states.
///
/// Walks `new`'s keys in sorted order; for each field the comparison kind
/// comes from `schema`. Empty string, empty list and null normalize to
/// "no value" on both sides.
pub fn diff_fields(schema: &FieldSchema, old: &FieldMap, new: &FieldMap) -> Vec<FieldDelta> {
    let mut deltas = Vec::new();
    for (field, new_value) in new {
        let old_value = old.get(field);
        // Both sides empty: nothing to report regardless of kind.
        if !has_value(new_value) && !old_value.is_some_and(has_value) {
            continue;
        }
        match schema.kind_of(field) {
            FieldKind::Scalar => diff_scalar(field, old_value, new_value, &mut deltas),
            FieldKind::Inline => diff_inline(field, old_value, new_value, &mut deltas),
            FieldKind::NameSet => diff_name_set(field, old_value, new_value, &mut deltas),
            FieldKind::PairList => diff_pairs(field, old_value, new_value, &mut deltas),
            FieldKind::KeyedRows { key } => {
                diff_keyed_rows(field, key, old_value, new_value, &mut deltas)
            }
        }
    }
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(entries: &[(&str, Value)]) -> FieldMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_scalar_change() {
        let schema = FieldSchema::metric();
        let old = map(&[("name", json!("argo.AMS-Check"))]);
        let new = map(&[("name", json!("argo.AMS-Check-new"))]);
        let deltas = diff_fields(&schema, &old, &new);
        assert_eq!(
            deltas,
            vec![FieldDelta {
                field: "name".to_string(),
                kind: DeltaKind::Changed,
                objects: vec![],
            }]
        );
    }

    #[test]
    fn test_inline_change_attributed_to_key() {
        let schema = FieldSchema::metric();
        let old = map(&[("config", json!(["timeout 60", "retryInterval 3"]))]);
        let new = map(&[("config", json!(["timeout 70", "retryInterval 3"]))]);
        let deltas = diff_fields(&schema, &old, &new);
        assert_eq!(
            deltas,
            vec![FieldDelta {
                field: "config".to_string(),
                kind: DeltaKind::Changed,
                objects: vec!["timeout".to_string()],
            }]
        );
    }

    #[test]
    fn test_old_only_field_is_skipped() {
        let schema = FieldSchema::metric();
        let old = map(&[
            ("name", json!("m")),
            ("retired_field", json!("gone")),
        ]);
        let new = map(&[("name", json!("m"))]);
        assert!(diff_fields(&schema, &old, &new).is_empty());
    }

    #[test]
    fn test_empty_and_absent_both_mean_no_value() {
        let schema = FieldSchema::metric();
        let old = map(&[("parent", json!(""))]);
        let new = map(&[("parent", json!("")), ("probeexecutable", json!(""))]);
        assert!(diff_fields(&schema, &old, &new).is_empty());

        let new = map(&[("parent", json!("org.parent.Metric"))]);
        let deltas = diff_fields(&schema, &old, &new);
        assert_eq!(deltas[0].kind, DeltaKind::Added);
        assert_eq!(deltas[0].field, "parent");
    }

    #[test]
    fn test_pairs_yield_one_delta_each() {
        let schema = FieldSchema::metric_profile();
        let old = map(&[("metricinstances", json!([["APEL", "org.apel.APEL-Pub"]]))]);
        let new = map(&[(
            "metricinstances",
            json!([["APEL", "org.apel.APEL-Sync"], ["ARC-CE", "org.nordugrid.ARC-CE-IGTF"]]),
        )]);
        let deltas = diff_fields(&schema, &old, &new);
        assert_eq!(deltas.len(), 3);
        assert!(deltas.contains(&FieldDelta {
            field: "metricinstances".to_string(),
            kind: DeltaKind::Added,
            objects: vec!["APEL".to_string(), "org.apel.APEL-Sync".to_string()],
        }));
        assert!(deltas.contains(&FieldDelta {
            field: "metricinstances".to_string(),
            kind: DeltaKind::Deleted,
            objects: vec!["APEL".to_string(), "org.apel.APEL-Pub".to_string()],
        }));
    }

    #[test]
    fn test_keyed_rows_inner_change_is_changed() {
        let schema = FieldSchema::aggregation_profile();
        let old = map(&[(
            "groups",
            json!([{"name": "compute", "operation": "OR", "services": []}]),
        )]);
        let new = map(&[(
            "groups",
            json!([
                {"name": "compute", "operation": "AND", "services": []},
                {"name": "storage", "operation": "OR", "services": []}
            ]),
        )]);
        let deltas = diff_fields(&schema, &old, &new);
        assert!(deltas.contains(&FieldDelta {
            field: "groups".to_string(),
            kind: DeltaKind::Added,
            objects: vec!["storage".to_string()],
        }));
        assert!(deltas.contains(&FieldDelta {
            field: "groups".to_string(),
            kind: DeltaKind::Changed,
            objects: vec!["compute".to_string()],
        }));
    }

    #[test]
    fn test_tags_compare_by_name_set() {
        let schema = FieldSchema::metric();
        let old = map(&[("tags", json!(["internal", "test_tag1"]))]);
        let new = map(&[("tags", json!(["test_tag1", "test_tag2"]))]);
        let deltas = diff_fields(&schema, &old, &new);
        assert_eq!(
            deltas,
            vec![
                FieldDelta {
                    field: "tags".to_string(),
                    kind: DeltaKind::Added,
                    objects: vec!["test_tag2".to_string()],
                },
                FieldDelta {
                    field: "tags".to_string(),
                    kind: DeltaKind::Deleted,
                    objects: vec!["internal".to_string()],
                },
            ]
        );
    }
}
