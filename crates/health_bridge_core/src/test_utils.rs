//! Test-only provider wrapping a [`FixtureProvider`] with failure injection,
//! artificial latency and a controllable authorization prompt.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use crate::catalog::Platform;
use crate::error::ProviderError;
use crate::fixture::{FixtureData, FixtureProvider};
use crate::native::{
    AggregationBucket, AggregationResult, NativeLocation, NativeMetric, NativeRecord, RecordType,
    RouteRef,
};
use crate::time::{Bucket, TimeRange};
use crate::HealthProvider;

/// Lets a test observe a prompt opening and decide when it resolves.
#[derive(Default)]
pub struct PromptGate {
    pub opened: Notify,
    pub release: Notify,
}

pub struct ScriptedProvider {
    inner: FixtureProvider,
    gate: Option<Arc<PromptGate>>,
    grouped: Option<Vec<AggregationBucket>>,
    failing_metrics: HashSet<NativeMetric>,
    fail_heart_rate: bool,
    fail_routes: bool,
    fail_sessions: bool,
    fail_grant_reads: bool,
    delays: Vec<(DateTime<Utc>, Duration)>,
    granted_reads: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(data: FixtureData) -> Self {
        Self {
            inner: FixtureProvider::new(data),
            gate: None,
            grouped: None,
            failing_metrics: HashSet::new(),
            fail_heart_rate: false,
            fail_routes: false,
            fail_sessions: false,
            fail_grant_reads: false,
            delays: Vec::new(),
            granted_reads: AtomicUsize::new(0),
        }
    }

    pub fn with_prompt_gate(mut self) -> Self {
        self.gate = Some(Arc::new(PromptGate::default()));
        self
    }

    pub fn prompt_gate(&self) -> Option<Arc<PromptGate>> {
        self.gate.clone()
    }

    pub fn with_grouped(mut self, buckets: Vec<AggregationBucket>) -> Self {
        self.grouped = Some(buckets);
        self
    }

    pub fn failing_metric(mut self, metric: NativeMetric) -> Self {
        self.failing_metrics.insert(metric);
        self
    }

    pub fn failing_heart_rate(mut self) -> Self {
        self.fail_heart_rate = true;
        self
    }

    pub fn failing_routes(mut self) -> Self {
        self.fail_routes = true;
        self
    }

    pub fn failing_sessions(mut self) -> Self {
        self.fail_sessions = true;
        self
    }

    pub fn failing_grant_reads(mut self) -> Self {
        self.fail_grant_reads = true;
        self
    }

    /// Slow down every sub-query whose range starts at `start`.
    pub fn delay_from(mut self, start: DateTime<Utc>, delay: Duration) -> Self {
        self.delays.push((start, delay));
        self
    }

    pub fn granted_reads(&self) -> usize {
        self.granted_reads.load(Ordering::SeqCst)
    }

    pub fn authorization_requests(&self) -> usize {
        self.inner.authorization_requests()
    }

    async fn maybe_delay(&self, range: &TimeRange) {
        if let Some((_, d)) = self.delays.iter().find(|(s, _)| *s == range.start) {
            tokio::time::sleep(*d).await;
        }
    }
}

#[async_trait]
impl HealthProvider for ScriptedProvider {
    fn platform(&self) -> Platform {
        self.inner.platform()
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn granted_identifiers(&self) -> Result<BTreeSet<String>, ProviderError> {
        self.granted_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_grant_reads {
            return Err(ProviderError::query("grant read failed"));
        }
        self.inner.granted_identifiers().await
    }

    async fn request_authorization(
        &self,
        identifiers: &BTreeSet<String>,
    ) -> Result<bool, ProviderError> {
        if let Some(gate) = &self.gate {
            gate.opened.notify_one();
            gate.release.notified().await;
        }
        self.inner.request_authorization(identifiers).await
    }

    async fn read_records(
        &self,
        record_type: RecordType,
        range: &TimeRange,
    ) -> Result<Vec<NativeRecord>, ProviderError> {
        match record_type {
            RecordType::ExerciseSession if self.fail_sessions => {
                Err(ProviderError::query("sessions unavailable"))
            }
            RecordType::HeartRate if self.fail_heart_rate => {
                self.maybe_delay(range).await;
                Err(ProviderError::query("heart rate read failed"))
            }
            _ => {
                if record_type == RecordType::HeartRate {
                    self.maybe_delay(range).await;
                }
                self.inner.read_records(record_type, range).await
            }
        }
    }

    async fn read_route(&self, route: &RouteRef) -> Result<Vec<NativeLocation>, ProviderError> {
        if self.fail_routes {
            return Err(ProviderError::query("route read failed"));
        }
        self.inner.read_route(route).await
    }

    async fn aggregate(
        &self,
        metric: NativeMetric,
        range: &TimeRange,
    ) -> Result<AggregationResult, ProviderError> {
        self.maybe_delay(range).await;
        if self.failing_metrics.contains(&metric) {
            return Err(ProviderError::query(format!("{metric:?} aggregate failed")));
        }
        self.inner.aggregate(metric, range).await
    }

    async fn aggregate_grouped(
        &self,
        metric: NativeMetric,
        range: &TimeRange,
        bucket: Bucket,
    ) -> Result<Vec<AggregationBucket>, ProviderError> {
        match &self.grouped {
            Some(buckets) => Ok(buckets.clone()),
            None => self.inner.aggregate_grouped(metric, range, bucket).await,
        }
    }

    async fn open_settings(&self) -> Result<(), ProviderError> {
        self.inner.open_settings().await
    }

    async fn open_store_listing(&self) -> Result<(), ProviderError> {
        self.inner.open_store_listing().await
    }
}
