//! Shapes of the data handed back by a native health store.
//!
//! These mirror what Health Connect and HealthKit return, reduced to the
//! fields the core reads. Quantities keep their native unit; converting to
//! the canonical unit is the metric resolver's job.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Native aggregate handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeMetric {
    StepsCountTotal,
    ActiveCaloriesTotal,
    DistanceTotal,
}

/// Record families readable with [`HealthProvider::read_records`](crate::HealthProvider::read_records).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordType {
    ExerciseSession,
    HeartRate,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Energy {
    Kilocalories(f64),
    Kilojoules(f64),
    Joules(f64),
}

impl Energy {
    pub fn in_kilocalories(self) -> f64 {
        match self {
            Energy::Kilocalories(v) => v,
            Energy::Kilojoules(v) => v / 4.184,
            Energy::Joules(v) => v / 4184.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    Meters(f64),
    Kilometers(f64),
    Miles(f64),
    Feet(f64),
}

impl Length {
    pub fn in_meters(self) -> f64 {
        match self {
            Length::Meters(v) => v,
            Length::Kilometers(v) => v * 1000.0,
            Length::Miles(v) => v * 1609.344,
            Length::Feet(v) => v * 0.3048,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeQuantity {
    Count(i64),
    Energy(Energy),
    Length(Length),
}

/// Result of one aggregate request. A metric with no data is simply missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationResult {
    values: HashMap<NativeMetric, NativeQuantity>,
}

impl AggregationResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric: NativeMetric, quantity: NativeQuantity) -> Self {
        self.values.insert(metric, quantity);
        self
    }

    pub fn get(&self, metric: NativeMetric) -> Option<&NativeQuantity> {
        self.values.get(&metric)
    }
}

/// One slice of a grouped aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregationBucket {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub result: AggregationResult,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSegment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativeLocation {
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: Option<Length>,
}

/// A route attached to a session: either delivered with it or stored
/// separately and read on demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRef {
    Inline(Vec<NativeLocation>),
    Stored(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativeWorkout {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Platform workout/exercise type code.
    pub activity_type: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub source_id: String,
    #[serde(default)]
    pub segments: Vec<SessionSegment>,
    #[serde(default)]
    pub routes: Vec<RouteRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NativeHeartRateSample {
    pub time: DateTime<Utc>,
    pub beats_per_minute: f64,
}

/// Heart-rate record; Health Connect groups samples into series, HealthKit
/// returns one sample per record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSeries {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub samples: Vec<NativeHeartRateSample>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NativeRecord {
    ExerciseSession(NativeWorkout),
    HeartRate(HeartRateSeries),
}
