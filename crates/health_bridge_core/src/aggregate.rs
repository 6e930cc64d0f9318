//! Bucketed aggregate queries for a single metric.

use std::sync::Arc;

use crate::error::HealthError;
use crate::metric::MetricDescriptor;
use crate::observability;
use crate::permissions::PermissionCoordinator;
use crate::records::AggregatedSample;
use crate::time::{Bucket, TimeRange};
use crate::HealthProvider;

pub struct AggregationEngine {
    provider: Arc<dyn HealthProvider>,
    permissions: Arc<PermissionCoordinator>,
}

impl AggregationEngine {
    pub fn new(provider: Arc<dyn HealthProvider>, permissions: Arc<PermissionCoordinator>) -> Self {
        Self {
            provider,
            permissions,
        }
    }

    /// One sample per bucket the store reports, ordered by bucket start.
    ///
    /// An ungranted metric yields an empty list. Buckets without data are not
    /// synthesized.
    pub async fn query_aggregated(
        &self,
        metric: MetricDescriptor,
        range: &TimeRange,
        bucket: Bucket,
    ) -> Result<Vec<AggregatedSample>, HealthError> {
        observability::record_query("aggregated");
        if !self.permissions.is_granted(metric.permission).await? {
            tracing::debug!(metric = %metric.kind, "permission not granted, returning no samples");
            return Ok(Vec::new());
        }

        let mut buckets = self
            .provider
            .aggregate_grouped(metric.native, range, bucket)
            .await?;
        buckets.sort_by_key(|b| b.start);

        tracing::debug!(metric = %metric.kind, %bucket, buckets = buckets.len(), "aggregated");
        Ok(buckets
            .into_iter()
            .map(|b| AggregatedSample {
                start_date: b.start,
                end_date: b.end,
                value: metric.value(&b.result),
            })
            .collect())
    }
}
