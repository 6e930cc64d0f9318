//! Provider wrapper adding timing and outcome logs to every store call.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use health_bridge_core::native::{AggregationBucket, AggregationResult};
use health_bridge_core::{
    Bucket, GrantReporting, HealthProvider, NativeLocation, NativeMetric, NativeRecord, Platform,
    ProviderError, RecordType, RouteRef, TimeRange,
};
use tracing::debug;

/// Wraps any [`HealthProvider`] and logs each call at debug level.
#[derive(Clone)]
pub struct LoggingMiddleware<P: HealthProvider> {
    inner: Arc<P>,
}

impl<P: HealthProvider> LoggingMiddleware<P> {
    pub fn new(provider: P) -> Self {
        Self {
            inner: Arc::new(provider),
        }
    }

    async fn with_logging<F, Fut, T>(&self, operation: F, name: &str) -> Result<T, ProviderError>
    where
        F: FnOnce(Arc<P>) -> Fut,
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let start = Instant::now();
        debug!("Starting store call: {}", name);

        let result = operation(self.inner.clone()).await;

        let duration = start.elapsed();
        match &result {
            Ok(_) => debug!("Store call completed: {} in {:?}", name, duration),
            Err(e) => debug!("Store call failed: {} in {:?} - error: {}", name, duration, e),
        }
        result
    }
}

#[async_trait::async_trait]
impl<P: HealthProvider> HealthProvider for LoggingMiddleware<P> {
    fn platform(&self) -> Platform {
        self.inner.platform()
    }

    fn grant_reporting(&self) -> GrantReporting {
        self.inner.grant_reporting()
    }

    async fn is_available(&self) -> bool {
        let available = self.inner.is_available().await;
        debug!("Store availability: {}", available);
        available
    }

    async fn granted_identifiers(&self) -> Result<BTreeSet<String>, ProviderError> {
        self.with_logging(
            |p| async move { p.granted_identifiers().await },
            "granted_identifiers",
        )
        .await
    }

    async fn request_authorization(
        &self,
        identifiers: &BTreeSet<String>,
    ) -> Result<bool, ProviderError> {
        self.with_logging(
            |p| async move { p.request_authorization(identifiers).await },
            "request_authorization",
        )
        .await
    }

    async fn read_records(
        &self,
        record_type: RecordType,
        range: &TimeRange,
    ) -> Result<Vec<NativeRecord>, ProviderError> {
        self.with_logging(
            |p| async move { p.read_records(record_type, range).await },
            "read_records",
        )
        .await
    }

    async fn read_route(&self, route: &RouteRef) -> Result<Vec<NativeLocation>, ProviderError> {
        self.with_logging(|p| async move { p.read_route(route).await }, "read_route")
            .await
    }

    async fn aggregate(
        &self,
        metric: NativeMetric,
        range: &TimeRange,
    ) -> Result<AggregationResult, ProviderError> {
        self.with_logging(
            |p| async move { p.aggregate(metric, range).await },
            "aggregate",
        )
        .await
    }

    async fn aggregate_grouped(
        &self,
        metric: NativeMetric,
        range: &TimeRange,
        bucket: Bucket,
    ) -> Result<Vec<AggregationBucket>, ProviderError> {
        self.with_logging(
            |p| async move { p.aggregate_grouped(metric, range, bucket).await },
            "aggregate_grouped",
        )
        .await
    }

    async fn open_settings(&self) -> Result<(), ProviderError> {
        self.with_logging(|p| async move { p.open_settings().await }, "open_settings")
            .await
    }

    async fn open_store_listing(&self) -> Result<(), ProviderError> {
        self.with_logging(
            |p| async move { p.open_store_listing().await },
            "open_store_listing",
        )
        .await
    }
}
