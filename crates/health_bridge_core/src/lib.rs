//! Permission normalization and data reconciliation over native health stores.
//!
//! A platform adapter implements [`HealthProvider`]; the components in this
//! crate turn its raw answers into one schema shared by every platform:
//!
//! - [`catalog`]: abstract permissions and their native identifiers
//! - [`permissions`]: grant checks and batched authorization prompts
//! - [`metric`]: metric names to native aggregate handles and unit conversion
//! - [`aggregate`]: bucketed aggregate queries
//! - [`workouts`]: workout sessions enriched with metrics, heart rate and routes

use std::collections::BTreeSet;

use async_trait::async_trait;

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fixture;
pub mod metric;
pub mod native;
pub mod observability;
pub mod permissions;
pub mod records;
pub mod time;
pub mod workout_types;
pub mod workouts;

#[cfg(test)]
mod test_utils;

pub use aggregate::AggregationEngine;
pub use catalog::{GrantReporting, Permission, PermissionCatalog, Platform};
pub use config::Config;
pub use error::{HealthError, HealthResult, ProviderError};
pub use metric::{MetricDescriptor, MetricKind};
pub use native::{
    AggregationBucket, AggregationResult, NativeLocation, NativeMetric, NativeRecord,
    NativeWorkout, RecordType, RouteRef,
};
pub use permissions::PermissionCoordinator;
pub use records::{AggregatedSample, HeartRateSample, RouteSample, WorkoutRecord};
pub use time::{Bucket, TimeRange};
pub use workouts::{WorkoutEnricher, WorkoutQuery, WorkoutQueryResult};

/// Capabilities of a platform health store.
///
/// Implementations wrap the native SDK; every method maps to a single store
/// call and performs no retries.
#[async_trait]
pub trait HealthProvider: Send + Sync + 'static {
    fn platform(&self) -> Platform;

    fn grant_reporting(&self) -> GrantReporting {
        self.platform().grant_reporting()
    }

    async fn is_available(&self) -> bool;

    /// Native identifiers the store currently reports as granted.
    async fn granted_identifiers(&self) -> Result<BTreeSet<String>, ProviderError>;

    /// Show one authorization prompt covering all `identifiers`.
    ///
    /// Returns the overall outcome; per-identifier state, where the platform
    /// has it, is read back through [`granted_identifiers`](Self::granted_identifiers).
    async fn request_authorization(
        &self,
        identifiers: &BTreeSet<String>,
    ) -> Result<bool, ProviderError>;

    async fn read_records(
        &self,
        record_type: RecordType,
        range: &TimeRange,
    ) -> Result<Vec<NativeRecord>, ProviderError>;

    /// Locations of a route stored apart from its session.
    async fn read_route(&self, route: &RouteRef) -> Result<Vec<NativeLocation>, ProviderError>;

    async fn aggregate(
        &self,
        metric: NativeMetric,
        range: &TimeRange,
    ) -> Result<AggregationResult, ProviderError>;

    async fn aggregate_grouped(
        &self,
        metric: NativeMetric,
        range: &TimeRange,
        bucket: Bucket,
    ) -> Result<Vec<AggregationBucket>, ProviderError>;

    async fn open_settings(&self) -> Result<(), ProviderError>;

    async fn open_store_listing(&self) -> Result<(), ProviderError>;
}
