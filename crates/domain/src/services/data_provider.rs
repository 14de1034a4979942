//! The data provider seam.
//!
//! The aggregation engine treats a provider as a (possibly I/O-bound) pure
//! function of the time range. Retry policy, if any, belongs to the provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::models::{
    CustomerFacet, EquipmentSnapshot, Facet, InventoryFacet, InventorySnapshot, OperationsFacet,
    PerformanceFacet, RealtimeMetrics, RevenueFacet, TimeRange, TrendsFacet,
};

/// Errors returned by data providers.
#[derive(Debug, Error)]
pub enum DataProviderError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed data: {0}")]
    Malformed(String),
}

/// Source of business figures for analytics.
#[async_trait::async_trait]
pub trait DataProvider: Send + Sync {
    async fn revenue(&self, range: TimeRange) -> Result<RevenueFacet, DataProviderError>;

    async fn operations(&self, range: TimeRange) -> Result<OperationsFacet, DataProviderError>;

    async fn customers(&self, range: TimeRange) -> Result<CustomerFacet, DataProviderError>;

    async fn inventory(&self, range: TimeRange) -> Result<InventoryFacet, DataProviderError>;

    async fn performance(&self, range: TimeRange) -> Result<PerformanceFacet, DataProviderError>;

    async fn trends(&self, range: TimeRange) -> Result<TrendsFacet, DataProviderError>;

    /// Live shop-floor figures for the push feed.
    async fn realtime_metrics(&self) -> Result<RealtimeMetrics, DataProviderError>;

    async fn inventory_snapshot(&self) -> Result<InventorySnapshot, DataProviderError>;

    async fn equipment_snapshot(&self) -> Result<EquipmentSnapshot, DataProviderError>;
}

/// Mock data provider for development and testing.
///
/// Serves fixed figures, counts calls per facet and can simulate latency or
/// a failing facet.
#[derive(Debug, Default)]
pub struct MockDataProvider {
    pub revenue: RevenueFacet,
    pub operations: OperationsFacet,
    pub customers: CustomerFacet,
    pub inventory: InventoryFacet,
    pub performance: PerformanceFacet,
    pub trends: TrendsFacet,
    pub inventory_snapshot: InventorySnapshot,
    pub equipment_snapshot: EquipmentSnapshot,
    /// Facet that always fails, if any.
    pub failing_facet: Option<Facet>,
    /// Artificial delay applied to every facet fetch.
    pub latency: Option<Duration>,
    realtime_failures: AtomicUsize,
    facet_calls: [AtomicUsize; 6],
    realtime_calls: AtomicUsize,
}

impl MockDataProvider {
    /// Create a new mock provider with zeroed figures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock provider whose `facet` fetch always fails.
    pub fn failing(facet: Facet) -> Self {
        Self {
            failing_facet: Some(facet),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next `count` realtime fetches fail.
    pub fn with_realtime_failures(self, count: usize) -> Self {
        self.realtime_failures.store(count, Ordering::SeqCst);
        self
    }

    /// Number of fetches made for `facet`.
    pub fn facet_calls(&self, facet: Facet) -> usize {
        self.facet_calls[Self::slot(facet)].load(Ordering::SeqCst)
    }

    /// Number of fetches made across all facets.
    pub fn total_facet_calls(&self) -> usize {
        self.facet_calls
            .iter()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    pub fn realtime_calls(&self) -> usize {
        self.realtime_calls.load(Ordering::SeqCst)
    }

    fn slot(facet: Facet) -> usize {
        match facet {
            Facet::Revenue => 0,
            Facet::Operations => 1,
            Facet::Customers => 2,
            Facet::Inventory => 3,
            Facet::Performance => 4,
            Facet::Trends => 5,
        }
    }

    async fn fetch<T: Clone>(&self, facet: Facet, value: &T) -> Result<T, DataProviderError> {
        self.facet_calls[Self::slot(facet)].fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing_facet == Some(facet) {
            tracing::warn!(facet = %facet, "Mock data provider simulating failure");
            return Err(DataProviderError::Unavailable(format!(
                "simulated {} failure",
                facet
            )));
        }

        Ok(value.clone())
    }
}

#[async_trait::async_trait]
impl DataProvider for MockDataProvider {
    async fn revenue(&self, _range: TimeRange) -> Result<RevenueFacet, DataProviderError> {
        self.fetch(Facet::Revenue, &self.revenue).await
    }

    async fn operations(&self, _range: TimeRange) -> Result<OperationsFacet, DataProviderError> {
        self.fetch(Facet::Operations, &self.operations).await
    }

    async fn customers(&self, _range: TimeRange) -> Result<CustomerFacet, DataProviderError> {
        self.fetch(Facet::Customers, &self.customers).await
    }

    async fn inventory(&self, _range: TimeRange) -> Result<InventoryFacet, DataProviderError> {
        self.fetch(Facet::Inventory, &self.inventory).await
    }

    async fn performance(&self, _range: TimeRange) -> Result<PerformanceFacet, DataProviderError> {
        self.fetch(Facet::Performance, &self.performance).await
    }

    async fn trends(&self, _range: TimeRange) -> Result<TrendsFacet, DataProviderError> {
        self.fetch(Facet::Trends, &self.trends).await
    }

    async fn realtime_metrics(&self) -> Result<RealtimeMetrics, DataProviderError> {
        self.realtime_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.realtime_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.realtime_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(DataProviderError::Unavailable(
                "simulated realtime failure".to_string(),
            ));
        }

        Ok(RealtimeMetrics {
            active_jobs: self.operations.jobs_in_progress,
            available_bays: 0,
            today_revenue: self.revenue.total_revenue,
            today_jobs: self.revenue.job_count,
            active_technicians: self.performance.active_technicians,
            queue_length: self.operations.jobs_scheduled,
            timestamp: Utc::now(),
        })
    }

    async fn inventory_snapshot(&self) -> Result<InventorySnapshot, DataProviderError> {
        Ok(self.inventory_snapshot.clone())
    }

    async fn equipment_snapshot(&self) -> Result<EquipmentSnapshot, DataProviderError> {
        Ok(self.equipment_snapshot.clone())
    }
}
