//! Request and response shapes of the plugin API.
//!
//! Field names are camelCase at the boundary. Dates stay strings here and are
//! parsed by the plugin so that a malformed value maps to `INVALID_PARAMETERS`
//! instead of a generic decoding failure.

use std::collections::BTreeMap;

use health_bridge_core::{AggregatedSample, WorkoutRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AvailabilityResult {
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PermissionsRequest {
    /// Abstract permission names such as `READ_STEPS`. Unknown names are ignored.
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PermissionsResult {
    pub permissions: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRequest {
    /// ISO-8601 start of the range (inclusive).
    pub start_date: String,
    /// ISO-8601 end of the range (exclusive).
    pub end_date: String,
    /// One of `steps`, `calories`, `distance`.
    pub data_type: String,
    /// One of `hour`, `day`, `week`.
    pub bucket: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResult {
    pub aggregated_data: Vec<AggregatedSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutsRequest {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub include_heart_rate: bool,
    #[serde(default)]
    pub include_route: bool,
    #[serde(default)]
    pub include_steps: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutsResult {
    pub workouts: Vec<WorkoutRecord>,
    /// Per-field sub-query failures; absent when nothing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}
