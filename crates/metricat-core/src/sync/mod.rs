//! Metric import/sync engine and the profile-synchronization seam.

pub mod engine;
pub mod profiles;

pub use engine::{import_metrics, update_metric_in_schema, update_metrics, ImportOutcome};
pub use profiles::ProfileSync;
