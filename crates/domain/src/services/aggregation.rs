//! Aggregation engine: cache-or-compute for analytics bundles.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use metrics::{counter, histogram};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::analytics_cache::AnalyticsCache;
use super::data_provider::DataProvider;
use crate::error::AnalyticsError;
use crate::models::{
    AnalyticsBundle, EquipmentSnapshot, Facet, InventorySnapshot, RealtimeMetrics, TimeRange,
};

/// Computes analytics bundles on cache misses and serves hits from the cache.
///
/// Concurrent misses for the same bucket are coalesced: one caller fetches,
/// the others wait on the bucket's lock and then read the filled cache.
pub struct AggregationEngine {
    provider: Arc<dyn DataProvider>,
    cache: AnalyticsCache,
    in_flight: HashMap<TimeRange, Mutex<()>>,
}

impl AggregationEngine {
    pub fn new(provider: Arc<dyn DataProvider>, cache: AnalyticsCache) -> Self {
        let in_flight = TimeRange::ALL
            .iter()
            .map(|range| (*range, Mutex::new(())))
            .collect();

        Self {
            provider,
            cache,
            in_flight,
        }
    }

    pub fn cache(&self) -> &AnalyticsCache {
        &self.cache
    }

    /// Returns the bundle for `range`, computing and caching it on a miss.
    ///
    /// If any facet fails the whole call fails with `DataUnavailable` and the
    /// cache is left untouched.
    pub async fn get_analytics_data(
        &self,
        range: TimeRange,
    ) -> Result<AnalyticsBundle, AnalyticsError> {
        if let Some(bundle) = self.cache.get(range).await {
            counter!("analytics_cache_hits_total", "range" => range.as_str()).increment(1);
            debug!(range = %range, "Analytics cache hit");
            return Ok(bundle);
        }
        counter!("analytics_cache_misses_total", "range" => range.as_str()).increment(1);

        let _flight = match self.in_flight.get(&range) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        // Another caller may have filled the bucket while we waited.
        if let Some(bundle) = self.cache.get(range).await {
            debug!(range = %range, "Analytics cache filled by concurrent request");
            return Ok(bundle);
        }

        let bundle = self.compute(range).await?;
        self.cache.put(range, bundle.clone()).await;

        Ok(bundle)
    }

    /// Fetches all six facets concurrently and assembles a bundle.
    async fn compute(&self, range: TimeRange) -> Result<AnalyticsBundle, AnalyticsError> {
        let start = Instant::now();
        let provider = &self.provider;

        let result = tokio::try_join!(
            async {
                provider
                    .revenue(range)
                    .await
                    .map_err(|e| AnalyticsError::data_unavailable(Facet::Revenue.as_str(), e))
            },
            async {
                provider
                    .operations(range)
                    .await
                    .map_err(|e| AnalyticsError::data_unavailable(Facet::Operations.as_str(), e))
            },
            async {
                provider
                    .customers(range)
                    .await
                    .map_err(|e| AnalyticsError::data_unavailable(Facet::Customers.as_str(), e))
            },
            async {
                provider
                    .inventory(range)
                    .await
                    .map_err(|e| AnalyticsError::data_unavailable(Facet::Inventory.as_str(), e))
            },
            async {
                provider
                    .performance(range)
                    .await
                    .map_err(|e| AnalyticsError::data_unavailable(Facet::Performance.as_str(), e))
            },
            async {
                provider
                    .trends(range)
                    .await
                    .map_err(|e| AnalyticsError::data_unavailable(Facet::Trends.as_str(), e))
            },
        );

        let elapsed = start.elapsed();
        histogram!("analytics_aggregation_duration_seconds", "range" => range.as_str())
            .record(elapsed.as_secs_f64());

        let (revenue, operations, customers, inventory, performance, trends) = match result {
            Ok(facets) => facets,
            Err(e) => {
                warn!(range = %range, error = %e, "Analytics aggregation failed");
                return Err(e);
            }
        };

        info!(
            range = %range,
            elapsed_ms = elapsed.as_millis(),
            "Analytics bundle computed"
        );

        Ok(AnalyticsBundle {
            range,
            revenue,
            operations,
            customers,
            inventory,
            performance,
            trends,
            generated_at: Utc::now(),
        })
    }

    /// Live shop-floor figures; never cached.
    pub async fn realtime_metrics(&self) -> Result<RealtimeMetrics, AnalyticsError> {
        self.provider
            .realtime_metrics()
            .await
            .map_err(|e| AnalyticsError::data_unavailable("realtime", e))
    }

    pub async fn inventory_snapshot(&self) -> Result<InventorySnapshot, AnalyticsError> {
        self.provider
            .inventory_snapshot()
            .await
            .map_err(|e| AnalyticsError::data_unavailable("inventory_snapshot", e))
    }

    pub async fn equipment_snapshot(&self) -> Result<EquipmentSnapshot, AnalyticsError> {
        self.provider
            .equipment_snapshot()
            .await
            .map_err(|e| AnalyticsError::data_unavailable("equipment_snapshot", e))
    }
}

impl std::fmt::Debug for AggregationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregationEngine")
            .field("cache", &self.cache)
            .finish()
    }
}
