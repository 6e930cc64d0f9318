//! Workout enrichment: sessions in a range, each joined with its metrics,
//! heart-rate samples and route.
//!
//! Sub-queries for one workout run concurrently and are joined before the
//! record is emitted. Workouts themselves are processed through an ordered
//! buffer, so output order is the store's order regardless of which workout
//! settles first. A failed sub-query drops its field and is reported in the
//! error map; it never fails the whole call.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};

use crate::catalog::Permission;
use crate::config::Config;
use crate::error::{HealthError, ProviderError};
use crate::metric::MetricKind;
use crate::native::{NativeRecord, NativeWorkout, RecordType, RouteRef};
use crate::observability;
use crate::permissions::PermissionCoordinator;
use crate::records::{HeartRateSample, RouteSample, WorkoutRecord};
use crate::time::TimeRange;
use crate::workout_types::workout_type_tag;
use crate::HealthProvider;

#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutQuery {
    pub range: TimeRange,
    pub include_heart_rate: bool,
    pub include_route: bool,
    pub include_steps: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkoutQueryResult {
    pub workouts: Vec<WorkoutRecord>,
    /// Field name to the first failure seen for it.
    pub errors: BTreeMap<String, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkoutField {
    Calories,
    Distance,
    Steps,
    HeartRate,
    Route,
}

impl WorkoutField {
    pub fn key(self) -> &'static str {
        match self {
            WorkoutField::Calories => "calories",
            WorkoutField::Distance => "distance",
            WorkoutField::Steps => "steps",
            WorkoutField::HeartRate => "heart-rate",
            WorkoutField::Route => "route",
        }
    }
}

/// Which sub-queries to run for every workout of one call.
#[derive(Clone, Copy, Debug)]
struct Plan {
    calories: bool,
    distance: bool,
    steps: bool,
    heart_rate: bool,
    route: bool,
}

struct FieldFailure {
    field: WorkoutField,
    error: ProviderError,
}

pub struct WorkoutEnricher {
    provider: Arc<dyn HealthProvider>,
    permissions: Arc<PermissionCoordinator>,
    concurrency: usize,
    report_errors: bool,
}

impl WorkoutEnricher {
    pub fn new(
        provider: Arc<dyn HealthProvider>,
        permissions: Arc<PermissionCoordinator>,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            permissions,
            concurrency: config.workout_concurrency.max(1),
            report_errors: config.report_sub_query_errors,
        }
    }

    pub async fn query_workouts(
        &self,
        query: &WorkoutQuery,
    ) -> Result<WorkoutQueryResult, HealthError> {
        observability::record_query("workouts");

        let mut wanted = vec![Permission::Calories, Permission::Distance];
        if query.include_steps {
            wanted.push(Permission::Steps);
        }
        if query.include_heart_rate {
            wanted.push(Permission::HeartRate);
        }
        let granted = self.permissions.granted(&wanted).await?;
        let plan = Plan {
            calories: granted.contains(&Permission::Calories),
            distance: granted.contains(&Permission::Distance),
            steps: query.include_steps && granted.contains(&Permission::Steps),
            heart_rate: query.include_heart_rate && granted.contains(&Permission::HeartRate),
            route: query.include_route,
        };
        tracing::debug!(?plan, "workout enrichment plan");

        let sessions: Vec<NativeWorkout> = self
            .provider
            .read_records(RecordType::ExerciseSession, &query.range)
            .await?
            .into_iter()
            .filter_map(|record| match record {
                NativeRecord::ExerciseSession(w) => Some(w),
                other => {
                    tracing::debug!(?other, "ignoring non-session record");
                    None
                }
            })
            .collect();

        let enriched: Vec<(WorkoutRecord, Vec<FieldFailure>)> = stream::iter(sessions)
            .map(|w| self.enrich(w, plan))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut result = WorkoutQueryResult::default();
        for (record, failures) in enriched {
            if self.report_errors {
                for f in failures {
                    result
                        .errors
                        .entry(f.field.key().to_string())
                        .or_insert_with(|| format!("workout {}: {}", record.id, f.error));
                }
            }
            result.workouts.push(record);
        }
        Ok(result)
    }

    async fn enrich(&self, workout: NativeWorkout, plan: Plan) -> (WorkoutRecord, Vec<FieldFailure>) {
        let range = TimeRange::new(workout.start, workout.end);

        let (calories, distance, steps, heart_rate, route) = tokio::join!(
            self.metric(plan.calories, MetricKind::Calories, &range),
            self.metric(plan.distance, MetricKind::Distance, &range),
            self.metric(plan.steps, MetricKind::Steps, &range),
            self.heart_rate(plan.heart_rate, &range),
            self.route(plan.route, &workout.routes),
        );

        let mut failures = Vec::new();
        let record = WorkoutRecord {
            workout_type: workout_type_tag(self.provider.platform(), workout.activity_type)
                .to_string(),
            duration: active_duration(&workout),
            calories: settle(WorkoutField::Calories, calories, &workout.id, &mut failures),
            distance: settle(WorkoutField::Distance, distance, &workout.id, &mut failures),
            steps: settle(WorkoutField::Steps, steps, &workout.id, &mut failures),
            heart_rate: settle(WorkoutField::HeartRate, heart_rate, &workout.id, &mut failures),
            route: settle(WorkoutField::Route, route, &workout.id, &mut failures),
            id: workout.id,
            start_date: workout.start,
            end_date: workout.end,
            title: workout.title,
            source_name: workout.source_name,
            source_bundle_id: workout.source_id,
        };
        (record, failures)
    }

    async fn metric(
        &self,
        enabled: bool,
        kind: MetricKind,
        range: &TimeRange,
    ) -> Result<Option<f64>, ProviderError> {
        if !enabled {
            return Ok(None);
        }
        let descriptor = kind.descriptor();
        let result = self.provider.aggregate(descriptor.native, range).await?;
        Ok(descriptor.value(&result))
    }

    async fn heart_rate(
        &self,
        enabled: bool,
        range: &TimeRange,
    ) -> Result<Option<Vec<HeartRateSample>>, ProviderError> {
        if !enabled {
            return Ok(None);
        }
        let records = self
            .provider
            .read_records(RecordType::HeartRate, range)
            .await?;
        let mut samples: Vec<HeartRateSample> = records
            .into_iter()
            .filter_map(|r| match r {
                NativeRecord::HeartRate(series) => Some(series.samples),
                _ => None,
            })
            .flatten()
            .filter(|s| range.contains_inclusive(s.time))
            .map(|s| HeartRateSample {
                timestamp: s.time,
                bpm: s.beats_per_minute,
            })
            .collect();
        samples.sort_by_key(|s| s.timestamp);
        Ok(Some(samples))
    }

    async fn route(
        &self,
        enabled: bool,
        routes: &[RouteRef],
    ) -> Result<Option<Vec<RouteSample>>, ProviderError> {
        if !enabled || routes.is_empty() {
            return Ok(None);
        }
        let parts = join_all(routes.iter().map(|route| async move {
            match route {
                RouteRef::Inline(locations) => Ok(locations.clone()),
                RouteRef::Stored(_) => self.provider.read_route(route).await,
            }
        }))
        .await;

        let mut samples = Vec::new();
        for part in parts {
            samples.extend(part?.into_iter().map(|l| RouteSample {
                timestamp: l.time,
                lat: l.latitude,
                lng: l.longitude,
                alt: l.altitude.map(|a| a.in_meters()),
            }));
        }
        Ok(Some(samples))
    }
}

/// Active seconds: the sum of the segments when present, otherwise the
/// wall-clock span of the session.
pub fn active_duration(workout: &NativeWorkout) -> f64 {
    let millis = if workout.segments.is_empty() {
        (workout.end - workout.start).num_milliseconds()
    } else {
        workout
            .segments
            .iter()
            .map(|s| (s.end - s.start).num_milliseconds())
            .sum()
    };
    millis as f64 / 1000.0
}

fn settle<T>(
    field: WorkoutField,
    outcome: Result<Option<T>, ProviderError>,
    workout_id: &str,
    failures: &mut Vec<FieldFailure>,
) -> Option<T> {
    match outcome {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(workout = workout_id, field = field.key(), %error, "sub-query failed, omitting field");
            observability::record_sub_query_failure(field.key());
            failures.push(FieldFailure { field, error });
            None
        }
    }
}
