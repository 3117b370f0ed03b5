//! Probes and packaging metadata in the shared catalog.

use crate::history::{EntityKind, EntityRef};
use crate::model::fields::FieldMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// A versioned software package that ships one or more probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name (e.g. `nagios-plugins-argo`)
    pub name: String,
    /// Package version (e.g. `0.1.11`)
    pub version: String,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Immutable pointer to a specific historical revision of a probe's
/// packaging metadata: the probe name plus the package version it shipped in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeKey {
    /// Probe name
    pub probe: String,
    /// Package version the probe revision shipped in
    pub version: String,
}

impl ProbeKey {
    pub fn new(probe: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            probe: probe.into(),
            version: version.into(),
        }
    }

    /// Snapshot representation: a two-element `[name, version]` array.
    pub fn to_value(&self) -> Value {
        json!([self.probe, self.version])
    }

    /// Human-readable `name (version)` form used in report leaves.
    pub fn display(&self) -> String {
        format!("{} ({})", self.probe, self.version)
    }
}

/// A monitoring probe in the shared, tenant-independent catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    /// Stable row id, survives renames
    pub id: String,
    pub name: String,
    /// Package currently shipping this probe
    pub package: Package,
    pub description: String,
    pub comment: String,
    pub repository: String,
    pub docurl: String,
}

impl Probe {
    pub fn new(name: impl Into<String>, package: Package) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            package,
            description: String::new(),
            comment: String::new(),
            repository: String::new(),
            docurl: String::new(),
        }
    }

    /// History key for this probe.
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::Probe, &self.id)
    }

    /// Serialize for version snapshots and diffing.
    pub fn serialize_fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("name".to_string(), json!(self.name));
        fields.insert(
            "package".to_string(),
            json!(format!("{} ({})", self.package.name, self.package.version)),
        );
        fields.insert("description".to_string(), json!(self.description));
        fields.insert("comment".to_string(), json!(self.comment));
        fields.insert("repository".to_string(), json!(self.repository));
        fields.insert("docurl".to_string(), json!(self.docurl));
        fields
    }
}
