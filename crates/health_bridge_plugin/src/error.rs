//! Errors returned across the plugin boundary.

use health_bridge_core::HealthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("unsupported metric: {0}")]
    UnsupportedMetric(String),

    #[error("unsupported bucket: {0}")]
    UnsupportedBucket(String),

    #[error("health store is not available")]
    ProviderUnavailable,

    #[error("a permission request is already pending")]
    RequestPending,

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("{0}")]
    Provider(String),
}

impl PluginError {
    /// Stable code reported to the application.
    pub fn code(&self) -> &'static str {
        match self {
            PluginError::InvalidParameters(_) => "INVALID_PARAMETERS",
            PluginError::UnsupportedMetric(_) => "UNSUPPORTED_METRIC",
            PluginError::UnsupportedBucket(_) => "UNSUPPORTED_BUCKET",
            PluginError::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            PluginError::RequestPending => "REQUEST_PENDING",
            PluginError::UnknownMethod(_) => "UNKNOWN_METHOD",
            PluginError::Provider(_) => "PROVIDER_ERROR",
        }
    }
}

impl From<HealthError> for PluginError {
    fn from(err: HealthError) -> Self {
        match err {
            HealthError::InvalidParameters(m) => PluginError::InvalidParameters(m),
            HealthError::UnsupportedMetric(m) => PluginError::UnsupportedMetric(m),
            HealthError::UnsupportedBucket(m) => PluginError::UnsupportedBucket(m),
            HealthError::RequestPending => PluginError::RequestPending,
            other => PluginError::Provider(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        PluginError::InvalidParameters(err.to_string())
    }
}

pub type PluginResult<T> = Result<T, PluginError>;
