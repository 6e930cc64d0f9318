//! Error types shared by the core components.

use thiserror::Error;

/// Failure reported by a native health store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("authorization prompt dismissed")]
    Dismissed,

    #[error("health store query failed: {0}")]
    Query(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }
}

/// Errors surfaced by the core to the plugin layer.
///
/// Missing permissions are not represented here: they always show up as
/// empty or omitted data.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("unsupported metric: {0}")]
    UnsupportedMetric(String),

    #[error("unsupported bucket: {0}")]
    UnsupportedBucket(String),

    #[error("a permission request is already pending")]
    RequestPending,

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("fixture error: {0}")]
    Fixture(#[from] serde_json::Error),
}

impl HealthError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }
}

pub type HealthResult<T> = Result<T, HealthError>;
