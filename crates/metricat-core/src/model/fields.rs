//! Serialized field mappings and per-field comparison schemas.
//!
//! Entities serialize into a [`FieldMap`] for version snapshots and diffing.
//! A [`FieldSchema`] supplies the canonical field list for an entity kind
//! together with the comparison kind of each field, so the differ can
//! attribute changes to specific list elements instead of whole fields.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Serialized state of an entity at a point in time.
///
/// `BTreeMap` keeps iteration order deterministic, which the differ and
/// comment builder rely on.
pub type FieldMap = BTreeMap<String, Value>;

/// How a field's value is compared by the differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Compared as a whole value
    Scalar,
    /// List of `"key value"` token lines, compared key by key
    Inline,
    /// Set of names, compared ignoring order
    NameSet,
    /// List of (service, metric) pairs, each pair reported individually
    PairList,
    /// Unordered list of dict-like rows compared by a natural key per row
    KeyedRows {
        /// Row field holding the natural key
        key: &'static str,
    },
}

/// Canonical field list for one entity kind.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    kinds: BTreeMap<&'static str, FieldKind>,
}

impl FieldSchema {
    fn from_pairs(pairs: &[(&'static str, FieldKind)]) -> Self {
        Self {
            kinds: pairs.iter().copied().collect(),
        }
    }

    /// Schema for local metrics and shared metric templates.
    pub fn metric() -> Self {
        use FieldKind::*;
        Self::from_pairs(&[
            ("name", Scalar),
            ("mtype", Scalar),
            ("tags", NameSet),
            ("probekey", Scalar),
            ("group", Scalar),
            ("parent", Scalar),
            ("probeexecutable", Scalar),
            ("description", Scalar),
            ("config", Inline),
            ("attribute", Inline),
            ("dependency", Inline),
            ("flags", Inline),
            ("files", Inline),
            ("parameter", Inline),
            ("fileparameter", Inline),
        ])
    }

    /// Schema for metric profiles.
    pub fn metric_profile() -> Self {
        use FieldKind::*;
        Self::from_pairs(&[
            ("name", Scalar),
            ("description", Scalar),
            ("apiid", Scalar),
            ("metricinstances", PairList),
        ])
    }

    /// Schema for aggregation profiles.
    pub fn aggregation_profile() -> Self {
        use FieldKind::*;
        Self::from_pairs(&[
            ("name", Scalar),
            ("apiid", Scalar),
            ("endpoint_group", Scalar),
            ("metric_operation", Scalar),
            ("profile_operation", Scalar),
            ("metric_profile", Scalar),
            ("groups", KeyedRows { key: "name" }),
        ])
    }

    /// Schema for thresholds profiles.
    pub fn thresholds_profile() -> Self {
        use FieldKind::*;
        Self::from_pairs(&[
            ("name", Scalar),
            ("apiid", Scalar),
            ("rules", KeyedRows { key: "metric" }),
        ])
    }

    /// Schema for probes.
    pub fn probe() -> Self {
        use FieldKind::*;
        Self::from_pairs(&[
            ("name", Scalar),
            ("package", Scalar),
            ("description", Scalar),
            ("comment", Scalar),
            ("repository", Scalar),
            ("docurl", Scalar),
        ])
    }

    /// Comparison kind of a field; unknown fields compare as scalars.
    pub fn kind_of(&self, field: &str) -> FieldKind {
        self.kinds.get(field).copied().unwrap_or(FieldKind::Scalar)
    }
}

/// Whether a value counts as present.
///
/// Empty string, empty list and null all normalize to "no value".
pub fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Parse an Inline field value into a key → rest-of-line map.
///
/// Each array element is a `"key value"` token line split on the first
/// space; a line without a space maps the whole line to an empty value.
pub fn inline_map(value: &Value) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    if let Value::Array(items) = value {
        for item in items {
            if let Value::String(line) = item {
                match line.split_once(' ') {
                    Some((key, rest)) => map.insert(key.to_string(), rest.to_string()),
                    None => map.insert(line.clone(), String::new()),
                };
            }
        }
    }
    map
}

/// Parse a NameSet field value into a sorted name set.
pub fn name_set(value: &Value) -> BTreeSet<String> {
    let mut set = BTreeSet::new();
    if let Value::Array(items) = value {
        for item in items {
            if let Value::String(name) = item {
                set.insert(name.clone());
            }
        }
    }
    set
}

/// Parse a PairList field value into a sorted set of (service, metric) pairs.
pub fn pair_set(value: &Value) -> BTreeSet<(String, String)> {
    let mut set = BTreeSet::new();
    if let Value::Array(items) = value {
        for item in items {
            if let Value::Array(pair) = item {
                if let (Some(Value::String(a)), Some(Value::String(b))) =
                    (pair.first(), pair.get(1))
                {
                    set.insert((a.clone(), b.clone()));
                }
            }
        }
    }
    set
}

/// Parse a KeyedRows field value into a key → row map.
///
/// Rows without the key field are skipped; duplicate keys collapse with the
/// last row winning.
pub fn keyed_rows(value: &Value, key: &str) -> BTreeMap<String, Value> {
    let mut map = BTreeMap::new();
    if let Value::Array(items) = value {
        for item in items {
            if let Some(Value::String(k)) = item.get(key) {
                map.insert(k.clone(), item.clone());
            }
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_value_normalizes_empty() {
        assert!(!has_value(&Value::Null));
        assert!(!has_value(&json!("")));
        assert!(!has_value(&json!([])));
        assert!(has_value(&json!("x")));
        assert!(has_value(&json!(["timeout 60"])));
    }

    #[test]
    fn test_inline_map_splits_on_first_space() {
        let value = json!(["timeout 60", "path /usr/libexec/argo-monitoring", "noargs"]);
        let map = inline_map(&value);
        assert_eq!(map.get("timeout"), Some(&"60".to_string()));
        assert_eq!(
            map.get("path"),
            Some(&"/usr/libexec/argo-monitoring".to_string())
        );
        assert_eq!(map.get("noargs"), Some(&String::new()));
    }

    #[test]
    fn test_pair_set_reads_two_element_arrays() {
        let value = json!([["ARC-CE", "org.nordugrid.ARC-CE-IGTF"], ["APEL", "org.apel.APEL-Pub"]]);
        let pairs = pair_set(&value);
        assert!(pairs.contains(&("ARC-CE".to_string(), "org.nordugrid.ARC-CE-IGTF".to_string())));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_keyed_rows_last_duplicate_wins() {
        let value = json!([
            {"name": "compute", "operation": "OR"},
            {"name": "compute", "operation": "AND"}
        ]);
        let rows = keyed_rows(&value, "name");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows["compute"]["operation"], json!("AND"));
    }

    #[test]
    fn test_unknown_field_defaults_to_scalar() {
        let schema = FieldSchema::metric();
        assert_eq!(schema.kind_of("config"), FieldKind::Inline);
        assert_eq!(schema.kind_of("somethingelse"), FieldKind::Scalar);
    }
}
