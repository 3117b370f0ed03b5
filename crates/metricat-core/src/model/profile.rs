//! Tenant-local profile rows and service bindings.
//!
//! Profile bodies live in the external web API; the local rows mirror the
//! identifying fields plus whatever the differ needs for version history.

use crate::history::{EntityKind, EntityRef};
use crate::model::fields::FieldMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// A metric profile row: named groups of (service, metric) instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricProfile {
    /// Stable row id, survives renames
    pub id: String,
    /// Id of the profile in the external web API
    pub apiid: String,
    pub name: String,
    pub description: String,
    /// (service, metric) pairs
    pub metricinstances: Vec<(String, String)>,
}

impl MetricProfile {
    pub fn new(apiid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            apiid: apiid.into(),
            name: name.into(),
            description: String::new(),
            metricinstances: Vec::new(),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::MetricProfile, &self.id)
    }

    /// Serialize for version snapshots and diffing.
    pub fn serialize_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("name".to_string(), json!(self.name));
        fields.insert("apiid".to_string(), json!(self.apiid));
        fields.insert("description".to_string(), json!(self.description));
        let instances: Vec<Value> = self
            .metricinstances
            .iter()
            .map(|(service, metric)| json!([service, metric]))
            .collect();
        fields.insert("metricinstances".to_string(), Value::Array(instances));
        fields
    }
}

/// An aggregation profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationProfile {
    pub id: String,
    pub apiid: String,
    pub name: String,
    pub endpoint_group: String,
    pub metric_operation: String,
    pub profile_operation: String,
    /// Name of the metric profile this aggregation is defined over
    pub metric_profile: String,
    /// Aggregation groups, keyed by `name` for diffing
    pub groups: Vec<Value>,
}

impl AggregationProfile {
    pub fn new(apiid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            apiid: apiid.into(),
            name: name.into(),
            endpoint_group: String::new(),
            metric_operation: String::new(),
            profile_operation: String::new(),
            metric_profile: String::new(),
            groups: Vec::new(),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::AggregationProfile, &self.id)
    }

    pub fn serialize_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("name".to_string(), json!(self.name));
        fields.insert("apiid".to_string(), json!(self.apiid));
        fields.insert("endpoint_group".to_string(), json!(self.endpoint_group));
        fields.insert("metric_operation".to_string(), json!(self.metric_operation));
        fields.insert(
            "profile_operation".to_string(),
            json!(self.profile_operation),
        );
        fields.insert("metric_profile".to_string(), json!(self.metric_profile));
        fields.insert("groups".to_string(), Value::Array(self.groups.clone()));
        fields
    }
}

/// A thresholds profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdsProfile {
    pub id: String,
    pub apiid: String,
    pub name: String,
    /// Threshold rules, keyed by `metric` for diffing
    pub rules: Vec<Value>,
}

impl ThresholdsProfile {
    pub fn new(apiid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            apiid: apiid.into(),
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::ThresholdsProfile, &self.id)
    }

    pub fn serialize_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("name".to_string(), json!(self.name));
        fields.insert("apiid".to_string(), json!(self.apiid));
        fields.insert("rules".to_string(), Value::Array(self.rules.clone()));
        fields
    }
}

/// A service row: the (area, name, type) triple the report tree is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub service_area: String,
    pub service_name: String,
    pub service_type: String,
}

/// Binds a metric to a service flavour (service type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricInstance {
    pub service_flavour: String,
    pub metric: String,
}
