//! HTTP client crate for the profile-synchronization web API.
//!
//! Implements the [`metricat_core::sync::ProfileSync`] seam over the
//! external profile catalog: listing, rewriting and pruning profile
//! definitions with per-tenant `x-api-key` authentication.

pub mod client;
pub mod config;
pub mod wire;

pub use client::WebApiClient;
pub use config::{WebApiConfig, API_KEY_NAME, DEFAULT_TIMEOUT};
pub use wire::{ProfileDocument, ProfileList, ServiceEntry};
