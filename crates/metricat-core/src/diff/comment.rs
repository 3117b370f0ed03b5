//! Change-comment construction.
//!
//! Turns field deltas into the persisted comment string: either the
//! sentinel `Initial version.` or a JSON sequence of single-bucket objects
//! of the form `{"changed": {"fields": ["config"], "object": ["timeout"]}}`.

use crate::diff::engine::{diff_fields, DeltaKind, FieldDelta};
use crate::history::{EntityRef, HistoryLog};
use crate::model::fields::{FieldMap, FieldSchema};
use serde_json::{json, Map, Value};

/// Comment carried by the first version of every entity, and by entities
/// still in their initial state.
pub const INITIAL_COMMENT: &str = "Initial version.";

/// One bucket entry of a structured change comment.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentEntry {
    pub kind: DeltaKind,
    /// Affected field names, sorted
    pub fields: Vec<String>,
    /// Affected list-element keys, sorted; empty for scalar aggregates
    pub objects: Vec<String>,
}

/// Group deltas into ordered comment entries.
///
/// List-valued deltas become one entry per (field, kind) carrying the
/// affected keys; scalar deltas aggregate into at most one entry per kind
/// with sorted field names. Object entries come first in (field, kind)
/// order, then the scalar aggregates in added/changed/deleted order.
pub fn build_entries(deltas: &[FieldDelta]) -> Vec<CommentEntry> {
    let mut object_entries: Vec<CommentEntry> = Vec::new();
    let mut scalar_added: Vec<String> = Vec::new();
    let mut scalar_changed: Vec<String> = Vec::new();
    let mut scalar_deleted: Vec<String> = Vec::new();

    for delta in deltas {
        if delta.objects.is_empty() {
            let bucket = match delta.kind {
                DeltaKind::Added => &mut scalar_added,
                DeltaKind::Changed => &mut scalar_changed,
                DeltaKind::Deleted => &mut scalar_deleted,
            };
            bucket.push(delta.field.clone());
        } else {
            object_entries.push(CommentEntry {
                kind: delta.kind,
                fields: vec![delta.field.clone()],
                objects: delta.objects.clone(),
            });
        }
    }

    object_entries.sort_by(|a, b| {
        (a.fields.clone(), a.kind, a.objects.clone()).cmp(&(
            b.fields.clone(),
            b.kind,
            b.objects.clone(),
        ))
    });

    let mut entries = object_entries;
    for (kind, mut fields) in [
        (DeltaKind::Added, scalar_added),
        (DeltaKind::Changed, scalar_changed),
        (DeltaKind::Deleted, scalar_deleted),
    ] {
        if !fields.is_empty() {
            fields.sort();
            entries.push(CommentEntry {
                kind,
                fields,
                objects: Vec::new(),
            });
        }
    }
    entries
}

/// Render entries as the persisted JSON comment string.
pub fn render(entries: &[CommentEntry]) -> String {
    let items: Vec<Value> = entries
        .iter()
        .map(|entry| {
            let mut body = Map::new();
            body.insert("fields".to_string(), json!(entry.fields));
            if !entry.objects.is_empty() {
                body.insert("object".to_string(), json!(entry.objects));
            }
            let mut outer = Map::new();
            outer.insert(entry.kind.as_str().to_string(), Value::Object(body));
            Value::Object(outer)
        })
        .collect();
    Value::Array(items).to_string()
}

/// Diff two states and render the comment string directly.
pub fn comment_from_states(schema: &FieldSchema, old: &FieldMap, new: &FieldMap) -> String {
    render(&build_entries(&diff_fields(schema, old, new)))
}

/// Comment for a create-style save.
///
/// No prior snapshot means the entity is new: the sentinel is returned and
/// no diff is computed. Otherwise the new state is diffed against the
/// latest snapshot.
pub fn create_comment(
    schema: &FieldSchema,
    history: &HistoryLog,
    entity: &EntityRef,
    new_fields: &FieldMap,
) -> String {
    match history.latest(entity) {
        None => INITIAL_COMMENT.to_string(),
        Some(latest) => comment_from_states(schema, &latest.fields, new_fields),
    }
}

/// Comment for an update-style save, where the caller amends the latest
/// snapshot in place.
///
/// An entity whose only snapshot still carries the sentinel is treated as
/// being in its initial state and keeps the sentinel; the first real edit
/// still reads as `Initial version.` until a second distinguishable version
/// exists. Otherwise the new state is diffed against the second-newest
/// snapshot, since the newest one is being rewritten.
pub fn update_comment(
    schema: &FieldSchema,
    history: &HistoryLog,
    entity: &EntityRef,
    new_fields: &FieldMap,
) -> String {
    let versions = history.versions(entity);
    match versions.as_slice() {
        [] => INITIAL_COMMENT.to_string(),
        [only] if only.comment == INITIAL_COMMENT => INITIAL_COMMENT.to_string(),
        [_latest, previous, ..] => comment_from_states(schema, &previous.fields, new_fields),
        [only] => comment_from_states(schema, &only.fields, new_fields),
    }
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
    fn test_config_key_change_renders_exact_payload() {
        let schema = FieldSchema::metric();
        let old = map(&[("config", json!(["timeout 60"]))]);
        let new = map(&[("config", json!(["timeout 70"]))]);
        let comment = comment_from_states(&schema, &old, &new);
        assert_eq!(
            comment,
            r#"[{"changed":{"fields":["config"],"object":["timeout"]}}]"#
        );
    }

    #[test]
    fn test_scalar_changes_aggregate_sorted() {
        let schema = FieldSchema::metric();
        let old = map(&[
            ("name", json!("argo.AMS-Check")),
            ("probeexecutable", json!("ams-probe")),
        ]);
        let new = map(&[
            ("name", json!("argo.AMS-Check-new")),
            ("probeexecutable", json!("ams-probe-new")),
        ]);
        let comment = comment_from_states(&schema, &old, &new);
        assert_eq!(
            comment,
            r#"[{"changed":{"fields":["name","probeexecutable"]}}]"#
        );
    }

    #[test]
    fn test_no_deltas_render_empty_sequence() {
        let schema = FieldSchema::metric();
        let state = map(&[("name", json!("m"))]);
        assert_eq!(comment_from_states(&schema, &state, &state), "[]");
    }

    #[test]
    fn test_object_entries_precede_scalar_aggregates() {
        let schema = FieldSchema::metric();
        let old = map(&[
            ("name", json!("m")),
            ("config", json!(["timeout 60"])),
        ]);
        let new = map(&[
            ("name", json!("m2")),
            ("config", json!(["timeout 60", "retryInterval 3"])),
        ]);
        let comment = comment_from_states(&schema, &old, &new);
        assert_eq!(
            comment,
            r#"[{"added":{"fields":["config"],"object":["retryInterval"]}},{"changed":{"fields":["name"]}}]"#
        );
    }
}
