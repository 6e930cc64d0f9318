use std::path::PathBuf;

use crate::error::HealthError;

const DEFAULT_WORKOUT_CONCURRENCY: usize = 4;

#[derive(Clone, Debug)]
pub struct Config {
    /// Workouts enriched at the same time.
    pub workout_concurrency: usize,
    /// Include the per-field error map in workout responses.
    pub report_sub_query_errors: bool,
    /// JSON dataset served by the bridge binary.
    pub fixture_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workout_concurrency: DEFAULT_WORKOUT_CONCURRENCY,
            report_sub_query_errors: true,
            fixture_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, HealthError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, HealthError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let workout_concurrency = match get("HEALTH_BRIDGE_WORKOUT_CONCURRENCY") {
            None => DEFAULT_WORKOUT_CONCURRENCY,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(HealthError::Config(format!(
                        "HEALTH_BRIDGE_WORKOUT_CONCURRENCY must be a positive integer, got '{raw}'"
                    )));
                }
            },
        };
        let report_sub_query_errors = match get("HEALTH_BRIDGE_REPORT_ERRORS").as_deref() {
            None => true,
            Some("1" | "true" | "yes") => true,
            Some("0" | "false" | "no") => false,
            Some(other) => {
                return Err(HealthError::Config(format!(
                    "HEALTH_BRIDGE_REPORT_ERRORS must be a boolean, got '{other}'"
                )));
            }
        };
        let fixture_path = get("HEALTH_BRIDGE_FIXTURE").map(PathBuf::from);
        Ok(Self {
            workout_concurrency,
            report_sub_query_errors,
            fixture_path,
        })
    }
}
