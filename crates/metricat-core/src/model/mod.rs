//! Catalog data model: field mappings, shared-catalog and tenant entities.

pub mod fields;
pub mod metric;
pub mod probe;
pub mod profile;
pub mod template;

pub use fields::{FieldKind, FieldMap, FieldSchema};
pub use metric::Metric;
pub use probe::{Package, Probe, ProbeKey};
pub use profile::{
    AggregationProfile, MetricInstance, MetricProfile, Service, ThresholdsProfile,
};
pub use template::{MetricKind, MetricTemplate, TemplateRevision};
