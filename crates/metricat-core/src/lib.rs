//! Metadata-management backend for a monitoring-profile catalog.
//!
//! Metric templates and probes live in a shared, tenant-independent
//! catalog; each tenant holds its own metrics, profiles and version
//! history. Every mutation produces a computed change comment by diffing
//! the previous serialized state against the new one and persists an
//! immutable version snapshot.
//!
//! Module map:
//! * [`model`] - entities and their serialized field mappings
//! * [`diff`] - field differ and comment builder
//! * [`history`] - version snapshot log
//! * [`ops`] - catalog store, metric and profile operations
//! * [`sync`] - metric import engine and profile-sync seam
//! * [`report`] - service-tree report
//! * [`errors`] / [`logging`] - error taxonomy and tracing setup

pub mod diff;
pub mod errors;
pub mod history;
pub mod logging;
pub mod model;
pub mod ops;
pub mod report;
pub mod sync;

pub use diff::{DeltaKind, FieldDelta, INITIAL_COMMENT};
pub use errors::{CatalogError, Result};
pub use history::{EntityKind, EntityRef, HistoryLog, VersionSnapshot};
pub use model::{
    FieldKind, FieldMap, FieldSchema, Metric, MetricKind, MetricProfile, MetricTemplate,
    Package, Probe, ProbeKey, TemplateRevision,
};
pub use ops::{Catalog, SharedCatalog, TenantStore};
pub use sync::{ImportOutcome, ProfileSync};
