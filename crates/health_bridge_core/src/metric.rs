//! Metric resolver: abstract metric names to native aggregate handles.

use std::fmt;
use std::str::FromStr;

use crate::catalog::Permission;
use crate::error::HealthError;
use crate::native::{AggregationResult, NativeMetric, NativeQuantity};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Steps,
    Calories,
    Distance,
}

impl MetricKind {
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Steps => "steps",
            MetricKind::Calories => "calories",
            MetricKind::Distance => "distance",
        }
    }

    pub fn descriptor(self) -> MetricDescriptor {
        match self {
            MetricKind::Steps => MetricDescriptor {
                kind: self,
                permission: Permission::Steps,
                native: NativeMetric::StepsCountTotal,
                extract: extract_count,
            },
            MetricKind::Calories => MetricDescriptor {
                kind: self,
                permission: Permission::Calories,
                native: NativeMetric::ActiveCaloriesTotal,
                extract: extract_kilocalories,
            },
            MetricKind::Distance => MetricDescriptor {
                kind: self,
                permission: Permission::Distance,
                native: NativeMetric::DistanceTotal,
                extract: extract_meters,
            },
        }
    }
}

impl FromStr for MetricKind {
    type Err = HealthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steps" => Ok(MetricKind::Steps),
            "calories" | "active-calories" => Ok(MetricKind::Calories),
            "distance" => Ok(MetricKind::Distance),
            other => Err(HealthError::UnsupportedMetric(other.to_string())),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything needed to query one metric and read its value back.
#[derive(Clone, Copy)]
pub struct MetricDescriptor {
    pub kind: MetricKind,
    /// Permission gating reads of this metric.
    pub permission: Permission,
    pub native: NativeMetric,
    extract: fn(Option<&NativeQuantity>) -> Option<f64>,
}

impl MetricDescriptor {
    /// Canonical value of this metric in `result`, `None` when missing.
    pub fn value(&self, result: &AggregationResult) -> Option<f64> {
        (self.extract)(result.get(self.native))
    }
}

impl fmt::Debug for MetricDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDescriptor")
            .field("kind", &self.kind)
            .field("permission", &self.permission)
            .field("native", &self.native)
            .finish_non_exhaustive()
    }
}

/// Resolve a metric by its boundary name. Heart rate is not
/// resolvable: it only exists as a per-workout sample series.
pub fn resolve(name: &str) -> Result<MetricDescriptor, HealthError> {
    name.parse::<MetricKind>().map(MetricKind::descriptor)
}

fn extract_count(q: Option<&NativeQuantity>) -> Option<f64> {
    match q? {
        NativeQuantity::Count(n) => Some(*n as f64),
        _ => None,
    }
}

fn extract_kilocalories(q: Option<&NativeQuantity>) -> Option<f64> {
    match q? {
        NativeQuantity::Energy(e) => Some(e.in_kilocalories()),
        _ => None,
    }
}

fn extract_meters(q: Option<&NativeQuantity>) -> Option<f64> {
    match q? {
        NativeQuantity::Length(l) => Some(l.in_meters()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{Energy, Length};

    #[test]
    fn resolves_closed_set_only() {
        assert_eq!(resolve("steps").unwrap().permission, Permission::Steps);
        assert_eq!(resolve("active-calories").unwrap().kind, MetricKind::Calories);
        assert_eq!(resolve("distance").unwrap().native, NativeMetric::DistanceTotal);
        assert!(matches!(
            resolve("heart-rate"),
            Err(HealthError::UnsupportedMetric(ref m)) if m == "heart-rate"
        ));
    }

    #[test]
    fn zero_is_distinct_from_missing() {
        let steps = resolve("steps").unwrap();
        let zero = AggregationResult::empty()
            .with(NativeMetric::StepsCountTotal, NativeQuantity::Count(0));
        assert_eq!(steps.value(&zero), Some(0.0));
        assert_eq!(steps.value(&AggregationResult::empty()), None);
    }

    #[test]
    fn converts_to_canonical_units() {
        let result = AggregationResult::empty()
            .with(
                NativeMetric::ActiveCaloriesTotal,
                NativeQuantity::Energy(Energy::Kilojoules(418.4)),
            )
            .with(
                NativeMetric::DistanceTotal,
                NativeQuantity::Length(Length::Kilometers(2.5)),
            );
        let kcal = resolve("calories").unwrap().value(&result).unwrap();
        assert!((kcal - 100.0).abs() < 1e-9);
        assert_eq!(resolve("distance").unwrap().value(&result), Some(2500.0));
    }

    #[test]
    fn mismatched_quantity_reads_as_missing() {
        let result = AggregationResult::empty()
            .with(NativeMetric::StepsCountTotal, NativeQuantity::Length(Length::Meters(3.0)));
        assert_eq!(resolve("steps").unwrap().value(&result), None);
    }
}
