//! Catalog store and operations.

pub mod metric_ops;
pub mod profile_ops;
pub mod store;
pub mod template_ops;

pub use metric_ops::{create_metric, delete_metric, list_metrics, update_metric};
pub use template_ops::{
    create_metric_template, create_probe, delete_metric_template, delete_probe,
    update_metric_template, update_probe,
};
pub use profile_ops::{
    create_aggregation_profile, create_metric_profile, create_thresholds_profile,
    delete_aggregation_profile, delete_metric_profile, delete_thresholds_profile,
    sync_aggregation_profiles, sync_profiles, sync_thresholds_profiles,
    update_aggregation_profile, update_metric_profile, update_thresholds_profile, FetchedProfile,
    SyncResult,
};
pub use store::{Catalog, SharedCatalog, TenantStore};
