//! Domain services for shop analytics.
//!
//! Services contain the caching, aggregation and alerting logic built on top
//! of the `DataProvider` seam.

pub mod aggregation;
pub mod alerts;
pub mod analytics_cache;
pub mod data_provider;

pub use aggregation::AggregationEngine;
pub use alerts::{AlertEvaluator, AlertThresholds};
pub use analytics_cache::{AnalyticsCache, CacheEntry, DEFAULT_CACHE_TTL};
pub use data_provider::{DataProvider, DataProviderError, MockDataProvider};
