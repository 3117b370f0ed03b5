//! Leaf types shared across the metricat workspace.
//!
//! This crate has no knowledge of the catalog model; it only carries the
//! tenant-context parameter threaded through every storage call and the
//! redaction wrapper used for web-API keys.

mod sensitive;
mod tenant;

pub use sensitive::Sensitive;
pub use tenant::TenantContext;
