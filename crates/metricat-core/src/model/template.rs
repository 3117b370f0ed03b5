//! Metric templates in the shared, tenant-independent catalog.

use crate::history::{EntityKind, EntityRef};
use crate::model::fields::FieldMap;
use crate::model::probe::ProbeKey;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Whether a metric is actively probed or passively reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    Active,
    Passive,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Active => "Active",
            MetricKind::Passive => "Passive",
        }
    }
}

/// Tenant-independent definition of a metric.
///
/// Active templates carry a probe key pinning the probe revision they were
/// written against; passive templates have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTemplate {
    /// Stable row id, survives renames
    pub id: String,
    pub name: String,
    pub kind: MetricKind,
    pub probekey: Option<ProbeKey>,
    pub description: String,
    /// Parent metric name, empty when none
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

impl MetricTemplate {
    /// Create an empty active template pinned at the given probe key.
    pub fn active(name: impl Into<String>, probekey: ProbeKey) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind: MetricKind::Active,
            probekey: Some(probekey),
            description: String::new(),
            parent: String::new(),
            probeexecutable: String::new(),
            config: Vec::new(),
            attribute: Vec::new(),
            dependency: Vec::new(),
            flags: Vec::new(),
            files: Vec::new(),
            parameter: Vec::new(),
            fileparameter: Vec::new(),
            tags: BTreeSet::new(),
        }
    }

    /// Create an empty passive template (no probe key).
    pub fn passive(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            kind: MetricKind::Passive,
            probekey: None,
            description: String::new(),
            parent: String::new(),
            probeexecutable: String::new(),
            config: Vec::new(),
            attribute: Vec::new(),
            dependency: Vec::new(),
            flags: Vec::new(),
            files: Vec::new(),
            parameter: Vec::new(),
            fileparameter: Vec::new(),
            tags: BTreeSet::new(),
        }
    }

    /// History key for this template.
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::MetricTemplate, &self.id)
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

/// Historical field values of a template, pinned at a probe revision.
///
/// Kept so tenants running an older package can import the template as it
/// was when that package version shipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRevision {
    /// Probe key this revision is pinned at
    pub probekey: ProbeKey,
    /// Full template values at that revision
    pub values: MetricTemplate,
}

impl TemplateRevision {
    pub fn new(probekey: ProbeKey, values: MetricTemplate) -> Self {
        Self { probekey, values }
    }
}
