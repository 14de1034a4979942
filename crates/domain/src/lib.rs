//! Domain layer for the shop analytics service.
//!
//! This crate contains:
//! - Domain models (bundles, reports, dashboards, alerts)
//! - The `DataProvider` seam and the caching/aggregation services built on it
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;

pub use error::AnalyticsError;
