//! Metric names and recording helpers.
//!
//! Only the `metrics` facade is used here; installing an exporter is up to the
//! embedding application.

use crate::catalog::Platform;

pub const PERMISSION_PROMPTS: &str = "health_bridge_permission_prompts_total";
pub const SUB_QUERY_FAILURES: &str = "health_bridge_sub_query_failures_total";
pub const QUERIES: &str = "health_bridge_queries_total";

fn platform_label(platform: Platform) -> &'static str {
    match platform {
        Platform::HealthConnect => "health_connect",
        Platform::HealthKit => "healthkit",
    }
}

pub fn record_permission_prompt(platform: Platform) {
    metrics::counter!(PERMISSION_PROMPTS, "platform" => platform_label(platform)).increment(1);
}

pub fn record_sub_query_failure(field: &'static str) {
    metrics::counter!(SUB_QUERY_FAILURES, "field" => field).increment(1);
}

pub fn record_query(kind: &'static str) {
    metrics::counter!(QUERIES, "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_a_recorder_is_a_no_op() {
        record_permission_prompt(Platform::HealthKit);
        record_sub_query_failure("route");
        record_query("workouts");
        assert_eq!(platform_label(Platform::HealthConnect), "health_connect");
    }
}
