//! Version history: immutable snapshots of entity state.
//!
//! Every entity save appends (or, on the amend path, rewrites) a
//! [`VersionSnapshot`] holding the full serialized field mapping, the
//! computed change comment, the acting user and a timestamp. Snapshots are
//! never mutated otherwise and are removed only when the owning entity is
//! deleted.

use crate::errors::{CatalogError, Result};
use crate::model::fields::FieldMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of entity a snapshot belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EntityKind {
    Probe,
    MetricTemplate,
    Metric,
    MetricProfile,
    AggregationProfile,
    ThresholdsProfile,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Probe => "probe",
            EntityKind::MetricTemplate => "metrictemplate",
            EntityKind::Metric => "metric",
            EntityKind::MetricProfile => "metricprofile",
            EntityKind::AggregationProfile => "aggregationprofile",
            EntityKind::ThresholdsProfile => "thresholdsprofile",
        }
    }
}

/// History key: entity kind plus its stable id.
///
/// The id is the entity's stable row id, not its name, so renames keep the
/// history attached.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.as_str(), self.id)
    }
}

/// Immutable record of an entity's serialized state at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    /// Snapshot id, unique within one log, monotonically increasing
    pub id: u64,
    pub entity: EntityRef,
    /// Full serialized field mapping at this version
    pub fields: FieldMap,
    /// Sentinel or structured change comment
    pub comment: String,
    /// Acting user
    pub user: String,
    pub date_created: DateTime<Utc>,
}

/// Append-only log of version snapshots, keyed by entity.
///
/// Not thread-safe; lives inside a single store scope (one tenant, or the
/// shared catalog) and is borrowed mutably per operation.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    snapshots: BTreeMap<EntityRef, Vec<VersionSnapshot>>,
    next_id: u64,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot and return its id.
    ///
    /// The writer persists what it is given; it validates nothing about
    /// field semantics.
    pub fn record(
        &mut self,
        entity: EntityRef,
        fields: FieldMap,
        comment: impl Into<String>,
        user: impl Into<String>,
    ) -> u64 {
        self.next_id += 1;
        let snapshot = VersionSnapshot {
            id: self.next_id,
            entity: entity.clone(),
            fields,
            comment: comment.into(),
            user: user.into(),
            date_created: Utc::now(),
        };
        self.snapshots.entry(entity).or_default().push(snapshot);
        self.next_id
    }

    /// Rewrite the newest snapshot in place.
    ///
    /// Used by the update save path when the probe key is unchanged: the
    /// latest version is amended rather than a new one appended.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotNotFound` if the entity has no snapshots.
    pub fn amend_latest(
        &mut self,
        entity: &EntityRef,
        fields: FieldMap,
        comment: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<()> {
        let latest = self
            .snapshots
            .get_mut(entity)
            .and_then(|v| v.last_mut())
            .ok_or_else(|| CatalogError::SnapshotNotFound {
                entity: entity.to_string(),
            })?;
        latest.fields = fields;
        latest.comment = comment.into();
        latest.user = user.into();
        latest.date_created = Utc::now();
        Ok(())
    }

    /// Newest snapshot for an entity, if any.
    pub fn latest(&self, entity: &EntityRef) -> Option<&VersionSnapshot> {
        self.snapshots.get(entity).and_then(|v| v.last())
    }

    /// All snapshots for an entity, newest first.
    pub fn versions(&self, entity: &EntityRef) -> Vec<&VersionSnapshot> {
        self.snapshots
            .get(entity)
            .map(|v| v.iter().rev().collect())
            .unwrap_or_default()
    }

    /// Number of snapshots for an entity.
    pub fn count(&self, entity: &EntityRef) -> usize {
        self.snapshots.get(entity).map(Vec::len).unwrap_or(0)
    }

    /// Remove every snapshot of an entity (cascading entity deletion).
    pub fn delete_for(&mut self, entity: &EntityRef) {
        self.snapshots.remove(entity);
    }
}
