//! Application-facing health API over a [`HealthProvider`].
//!
//! [`HealthPlugin`] validates boundary requests, gates data calls on store
//! availability, and forwards to the core engines. The [`bridge`] module
//! exposes it as line-delimited JSON for the host application.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use health_bridge_core::{
    AggregationEngine, Bucket, Config, HealthProvider, PermissionCoordinator, Platform,
    TimeRange, WorkoutEnricher, WorkoutQuery, metric,
};

pub mod bridge;
pub mod error;
pub mod middleware;
pub mod types;

pub use error::{PluginError, PluginResult};
pub use middleware::LoggingMiddleware;
pub use types::{
    AggregatedRequest, AggregatedResult, AvailabilityResult, PermissionsRequest,
    PermissionsResult, WorkoutsRequest, WorkoutsResult,
};

pub struct HealthPlugin {
    provider: Arc<dyn HealthProvider>,
    permissions: Arc<PermissionCoordinator>,
    aggregation: AggregationEngine,
    workouts: WorkoutEnricher,
    /// Set once the store has answered available; never cleared.
    available: AtomicBool,
}

impl HealthPlugin {
    pub fn new(provider: Arc<dyn HealthProvider>, config: &Config) -> Self {
        let permissions = Arc::new(PermissionCoordinator::new(provider.clone()));
        Self {
            aggregation: AggregationEngine::new(provider.clone(), permissions.clone()),
            workouts: WorkoutEnricher::new(provider.clone(), permissions.clone(), config),
            permissions,
            provider,
            available: AtomicBool::new(false),
        }
    }

    pub fn platform(&self) -> Platform {
        self.provider.platform()
    }

    pub async fn is_health_available(&self) -> AvailabilityResult {
        if self.available.load(Ordering::Acquire) {
            return AvailabilityResult { available: true };
        }
        let available = self.provider.is_available().await;
        if available {
            self.available.store(true, Ordering::Release);
        } else {
            tracing::info!(platform = ?self.platform(), "health store not available");
        }
        AvailabilityResult { available }
    }

    async fn ensure_available(&self) -> PluginResult<()> {
        if self.is_health_available().await.available {
            Ok(())
        } else {
            Err(PluginError::ProviderUnavailable)
        }
    }

    pub async fn check_health_permissions(
        &self,
        request: PermissionsRequest,
    ) -> PluginResult<PermissionsResult> {
        self.ensure_available().await?;
        let permissions = self
            .permissions
            .check_granted(request.permissions.as_slice())
            .await?;
        Ok(PermissionsResult { permissions })
    }

    pub async fn request_health_permissions(
        &self,
        request: PermissionsRequest,
    ) -> PluginResult<PermissionsResult> {
        self.ensure_available().await?;
        let permissions = self
            .permissions
            .request_granted(request.permissions.as_slice())
            .await?;
        Ok(PermissionsResult { permissions })
    }

    pub async fn query_aggregated(
        &self,
        request: AggregatedRequest,
    ) -> PluginResult<AggregatedResult> {
        let range = TimeRange::parse(&request.start_date, &request.end_date)?;
        let metric = metric::resolve(&request.data_type)?;
        let bucket: Bucket = request.bucket.parse()?;
        self.ensure_available().await?;

        let aggregated_data = self
            .aggregation
            .query_aggregated(metric, &range, bucket)
            .await?;
        Ok(AggregatedResult { aggregated_data })
    }

    pub async fn query_workouts(&self, request: WorkoutsRequest) -> PluginResult<WorkoutsResult> {
        let query = WorkoutQuery {
            range: TimeRange::parse(&request.start_date, &request.end_date)?,
            include_heart_rate: request.include_heart_rate,
            include_route: request.include_route,
            include_steps: request.include_steps,
        };
        self.ensure_available().await?;

        let result = self.workouts.query_workouts(&query).await?;
        Ok(WorkoutsResult {
            workouts: result.workouts,
            errors: (!result.errors.is_empty()).then_some(result.errors),
        })
    }

    /// Best effort: failures are logged, not returned.
    pub async fn open_health_settings(&self) {
        if let Err(e) = self.provider.open_settings().await {
            tracing::warn!(error = %e, "could not open health settings");
        }
    }

    /// Best effort: failures are logged, not returned.
    pub async fn show_in_store(&self) {
        if let Err(e) = self.provider.open_store_listing().await {
            tracing::warn!(error = %e, "could not open store listing");
        }
    }
}
