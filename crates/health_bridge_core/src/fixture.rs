//! In-memory health store loaded from a JSON dataset.
//!
//! Serves the bridge binary when no platform SDK is present, and backs the
//! integration tests and benchmarks. Aggregates are computed from raw
//! samples; grouped aggregates only report buckets that contain data.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::catalog::{GrantReporting, Platform};
use crate::error::{HealthError, ProviderError};
use crate::native::{
    AggregationBucket, AggregationResult, Energy, HeartRateSeries, Length, NativeLocation,
    NativeMetric, NativeQuantity, NativeRecord, NativeWorkout, RecordType, RouteRef,
};
use crate::time::{Bucket, TimeRange};
use crate::HealthProvider;

/// What the simulated user does when shown an authorization prompt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptOutcome {
    #[default]
    Accept,
    Deny,
    Dismiss,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MetricSample {
    pub metric: NativeMetric,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub quantity: NativeQuantity,
}

fn default_available() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct FixtureData {
    pub platform: Platform,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub granted: BTreeSet<String>,
    #[serde(default)]
    pub prompt: PromptOutcome,
    /// Identifiers the simulated user accepts; `None` accepts everything asked.
    #[serde(default)]
    pub grantable: Option<BTreeSet<String>>,
    #[serde(default)]
    pub workouts: Vec<NativeWorkout>,
    #[serde(default)]
    pub heart_rate: Vec<HeartRateSeries>,
    #[serde(default)]
    pub routes: HashMap<String, Vec<NativeLocation>>,
    #[serde(default)]
    pub samples: Vec<MetricSample>,
}

impl FixtureData {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            available: true,
            granted: BTreeSet::new(),
            prompt: PromptOutcome::Accept,
            grantable: None,
            workouts: Vec::new(),
            heart_rate: Vec::new(),
            routes: HashMap::new(),
            samples: Vec::new(),
        }
    }
}

pub struct FixtureProvider {
    data: FixtureData,
    granted: Mutex<BTreeSet<String>>,
    authorization_requests: AtomicUsize,
}

impl FixtureProvider {
    pub fn new(data: FixtureData) -> Self {
        Self {
            granted: Mutex::new(data.granted.clone()),
            data,
            authorization_requests: AtomicUsize::new(0),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, HealthError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_path(path: &Path) -> Result<Self, HealthError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| HealthError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    /// Number of prompts shown so far.
    pub fn authorization_requests(&self) -> usize {
        self.authorization_requests.load(Ordering::SeqCst)
    }

    fn sum_in(&self, metric: NativeMetric, range: &TimeRange) -> Option<NativeQuantity> {
        self.data
            .samples
            .iter()
            .filter(|s| s.metric == metric && range.contains(s.start))
            .map(|s| s.quantity)
            .reduce(add_quantities)
    }
}

/// Sum two quantities; mixed kinds keep the left-hand side.
fn add_quantities(a: NativeQuantity, b: NativeQuantity) -> NativeQuantity {
    match (a, b) {
        (NativeQuantity::Count(x), NativeQuantity::Count(y)) => NativeQuantity::Count(x + y),
        (NativeQuantity::Energy(x), NativeQuantity::Energy(y)) => NativeQuantity::Energy(
            Energy::Kilocalories(x.in_kilocalories() + y.in_kilocalories()),
        ),
        (NativeQuantity::Length(x), NativeQuantity::Length(y)) => {
            NativeQuantity::Length(Length::Meters(x.in_meters() + y.in_meters()))
        }
        (a, _) => a,
    }
}

#[async_trait]
impl HealthProvider for FixtureProvider {
    fn platform(&self) -> Platform {
        self.data.platform
    }

    async fn is_available(&self) -> bool {
        self.data.available
    }

    async fn granted_identifiers(&self) -> Result<BTreeSet<String>, ProviderError> {
        Ok(self.granted.lock().await.clone())
    }

    async fn request_authorization(
        &self,
        identifiers: &BTreeSet<String>,
    ) -> Result<bool, ProviderError> {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
        match self.data.prompt {
            PromptOutcome::Dismiss => Err(ProviderError::Dismissed),
            PromptOutcome::Deny => Ok(false),
            PromptOutcome::Accept => {
                // A coarse store never exposes what was granted.
                if self.grant_reporting() == GrantReporting::PerIdentifier {
                    let mut granted = self.granted.lock().await;
                    granted.extend(
                        identifiers
                            .iter()
                            .filter(|id| {
                                self.data.grantable.as_ref().is_none_or(|g| g.contains(*id))
                            })
                            .cloned(),
                    );
                }
                Ok(true)
            }
        }
    }

    async fn read_records(
        &self,
        record_type: RecordType,
        range: &TimeRange,
    ) -> Result<Vec<NativeRecord>, ProviderError> {
        let records = match record_type {
            RecordType::ExerciseSession => self
                .data
                .workouts
                .iter()
                .filter(|w| range.overlaps(w.start, w.end))
                .cloned()
                .map(NativeRecord::ExerciseSession)
                .collect(),
            RecordType::HeartRate => self
                .data
                .heart_rate
                .iter()
                .filter(|s| range.overlaps(s.start, s.end) || range.contains(s.start))
                .cloned()
                .map(NativeRecord::HeartRate)
                .collect(),
        };
        Ok(records)
    }

    async fn read_route(&self, route: &RouteRef) -> Result<Vec<NativeLocation>, ProviderError> {
        match route {
            RouteRef::Inline(locations) => Ok(locations.clone()),
            RouteRef::Stored(id) => self
                .data
                .routes
                .get(id)
                .cloned()
                .ok_or_else(|| ProviderError::query(format!("route {id} not found"))),
        }
    }

    async fn aggregate(
        &self,
        metric: NativeMetric,
        range: &TimeRange,
    ) -> Result<AggregationResult, ProviderError> {
        let mut result = AggregationResult::empty();
        if let Some(q) = self.sum_in(metric, range) {
            result = result.with(metric, q);
        }
        Ok(result)
    }

    async fn aggregate_grouped(
        &self,
        metric: NativeMetric,
        range: &TimeRange,
        bucket: Bucket,
    ) -> Result<Vec<AggregationBucket>, ProviderError> {
        let mut out = Vec::new();
        let mut start = range.start;
        while start < range.end {
            let end = (start + bucket.period()).min(range.end);
            let slice = TimeRange::new(start, end);
            if let Some(q) = self.sum_in(metric, &slice) {
                out.push(AggregationBucket {
                    start,
                    end,
                    result: AggregationResult::empty().with(metric, q),
                });
            }
            start = end;
        }
        Ok(out)
    }

    async fn open_settings(&self) -> Result<(), ProviderError> {
        tracing::debug!(platform = ?self.data.platform, "fixture: open settings");
        Ok(())
    }

    async fn open_store_listing(&self) -> Result<(), ProviderError> {
        match self.data.platform.catalog().store_listing() {
            Some(url) => {
                tracing::debug!(%url, "fixture: open store listing");
                Ok(())
            }
            None => Err(ProviderError::Other(
                "no store listing on this platform".to_string(),
            )),
        }
    }
}
