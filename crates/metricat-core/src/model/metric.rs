//! Tenant-local metrics.

use crate::history::{EntityKind, EntityRef};
use crate::model::fields::FieldMap;
use crate::model::probe::ProbeKey;
use crate::model::template::{MetricKind, MetricTemplate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A metric installed in one tenant's catalog.
///
/// Carries the same field surface as its template plus the tenant-assigned
/// group. The `id` is stable across renames; version history is keyed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    /// Stable row id, survives renames
    pub id: String,
    pub name: String,
    pub kind: MetricKind,
    pub probekey: Option<ProbeKey>,
    /// Tenant-assigned metric group
    pub group: String,
    pub description: String,
    pub parent: String,
    pub probeexecutable: String,
    pub config: Vec<String>,
    pub attribute: Vec<String>,
    pub dependency: Vec<String>,
    pub flags: Vec<String>,
    pub files: Vec<String>,
    pub parameter: Vec<String>,
    pub fileparameter: Vec<String>,
    pub tags: BTreeSet<String>,
}

impl Metric {
    /// Create a local metric from a template's current field values.
    ///
    /// Tags are copied by name; the probe key is pinned from the template.
    pub fn from_template(template: &MetricTemplate, group: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: template.name.clone(),
            kind: template.kind,
            probekey: template.probekey.clone(),
            group: group.into(),
            description: template.description.clone(),
            parent: template.parent.clone(),
            probeexecutable: template.probeexecutable.clone(),
            config: template.config.clone(),
            attribute: template.attribute.clone(),
            dependency: template.dependency.clone(),
            flags: template.flags.clone(),
            files: template.files.clone(),
            parameter: template.parameter.clone(),
            fileparameter: template.fileparameter.clone(),
            tags: template.tags.clone(),
        }
    }

    /// Copy every template field onto this metric except `config`, which the
    /// tenant owns. The id and group are untouched.
    pub fn apply_template(&mut self, template: &MetricTemplate) {
        self.name = template.name.clone();
        self.kind = template.kind;
        self.probekey = template.probekey.clone();
        self.description = template.description.clone();
        self.parent = template.parent.clone();
        self.probeexecutable = template.probeexecutable.clone();
        self.attribute = template.attribute.clone();
        self.dependency = template.dependency.clone();
        self.flags = template.flags.clone();
        self.files = template.files.clone();
        self.parameter = template.parameter.clone();
        self.fileparameter = template.fileparameter.clone();
        self.tags = template.tags.clone();
    }

    /// Copy every template field onto this metric including `config`.
    ///
    /// Used when restoring from a template revision, where the revision's
    /// config is authoritative.
    pub fn apply_template_with_config(&mut self, template: &MetricTemplate) {
        self.apply_template(template);
        self.config = template.config.clone();
    }

    /// History key for this metric.
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::Metric, &self.id)
    }

    /// Serialize for version snapshots and diffing.
    pub fn serialize_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("name".to_string(), json!(self.name));
        fields.insert("mtype".to_string(), json!(self.kind.as_str()));
        fields.insert(
            "probekey".to_string(),
            self.probekey
                .as_ref()
                .map(ProbeKey::to_value)
                .unwrap_or(Value::Null),
        );
        fields.insert("group".to_string(), json!(self.group));
        fields.insert("description".to_string(), json!(self.description));
        fields.insert("parent".to_string(), json!(self.parent));
        fields.insert("probeexecutable".to_string(), json!(self.probeexecutable));
        fields.insert("config".to_string(), json!(self.config));
        fields.insert("attribute".to_string(), json!(self.attribute));
        fields.insert("dependency".to_string(), json!(self.dependency));
        fields.insert("flags".to_string(), json!(self.flags));
        fields.insert("files".to_string(), json!(self.files));
        fields.insert("parameter".to_string(), json!(self.parameter));
        fields.insert("fileparameter".to_string(), json!(self.fileparameter));
        fields.insert(
            "tags".to_string(),
            json!(self.tags.iter().collect::<Vec<_>>()),
        );
        fields
    }
}
