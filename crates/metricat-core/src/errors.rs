use thiserror::Error;

/// Result type alias using CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Canonical error taxonomy for the catalog.
///
/// Not-found variants surface as 404-style errors at the boundary;
/// validation variants as 400-style. External-sync failures on the rename
/// path are downgraded to collected warning strings before they reach this
/// type; only operations contracted to fail loudly produce `ApiKeyMissing`
/// or `WebApi`. Import-eligibility conflicts are `ImportOutcome` buckets,
/// never errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("tenant not found: {name}")]
    TenantNotFound { name: String },

    #[error("metric not found: {name}")]
    MetricNotFound { name: String },

    #[error("metric template not found: {name}")]
    TemplateNotFound { name: String },

    #[error("probe not found: {name}")]
    ProbeNotFound { name: String },

    #[error("profile not found: {apiid}")]
    ProfileNotFound { apiid: String },

    #[error("no version snapshot recorded for {entity}")]
    SnapshotNotFound { entity: String },

    #[error("metric already exists: {name}")]
    MetricExists { name: String },

    #[error("metric template already exists: {name}")]
    TemplateExists { name: String },

    #[error("probe already exists: {name}")]
    ProbeExists { name: String },

    #[error("invalid profile payload: {reason}")]
    InvalidProfile { reason: String },

    #[error("invalid value for field {field}: {reason}")]
    InvalidFieldValue { field: String, reason: String },

    #[error("Error fetching WEB API data: API key not found.")]
    ApiKeyMissing { tenant: String },

    #[error("web API request failed: {message}")]
    WebApi { message: String },

    #[error("serialization failed: {message}")]
    Serialization { message: String },
}

impl CatalogError {
    /// Stable error code for programmatic handling and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::TenantNotFound { .. } => "ERR_TENANT_NOT_FOUND",
            CatalogError::MetricNotFound { .. } => "ERR_METRIC_NOT_FOUND",
            CatalogError::TemplateNotFound { .. } => "ERR_TEMPLATE_NOT_FOUND",
            CatalogError::ProbeNotFound { .. } => "ERR_PROBE_NOT_FOUND",
            CatalogError::ProfileNotFound { .. } => "ERR_PROFILE_NOT_FOUND",
            CatalogError::SnapshotNotFound { .. } => "ERR_SNAPSHOT_NOT_FOUND",
            CatalogError::MetricExists { .. } => "ERR_METRIC_EXISTS",
            CatalogError::TemplateExists { .. } => "ERR_TEMPLATE_EXISTS",
            CatalogError::ProbeExists { .. } => "ERR_PROBE_EXISTS",
            CatalogError::InvalidProfile { .. } => "ERR_INVALID_PROFILE",
            CatalogError::InvalidFieldValue { .. } => "ERR_INVALID_FIELD_VALUE",
            CatalogError::ApiKeyMissing { .. } => "ERR_API_KEY_MISSING",
            CatalogError::WebApi { .. } => "ERR_WEB_API",
            CatalogError::Serialization { .. } => "ERR_SERIALIZATION",
        }
    }

    /// True for the not-found family (404-style at the boundary).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::TenantNotFound { .. }
                | CatalogError::MetricNotFound { .. }
                | CatalogError::TemplateNotFound { .. }
                | CatalogError::ProbeNotFound { .. }
                | CatalogError::ProfileNotFound { .. }
                | CatalogError::SnapshotNotFound { .. }
        )
    }
}
