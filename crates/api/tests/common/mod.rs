//! Common test utilities for integration tests.
//!
//! The router is driven in-process with an in-memory `MockDataProvider`, so
//! no database is required.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use domain::services::{DataProvider, MockDataProvider};
use shop_analytics_api::{
    app::{create_app, AppState},
    config::Config,
};
use uuid::Uuid;

/// Unique scratch directory for report artifacts.
pub fn test_reports_dir() -> PathBuf {
    std::env::temp_dir().join(format!("shop-analytics-it-{}", Uuid::new_v4()))
}

/// Test configuration with embedded defaults and a private reports dir.
pub fn test_config() -> Config {
    let reports_dir = test_reports_dir();
    let reports_dir = reports_dir.to_string_lossy();
    Config::load_for_test(&[("analytics.reports_dir", reports_dir.as_ref())])
        .expect("Failed to build test config")
}

/// Build the state and router around `provider`.
pub fn create_test_state(provider: Arc<MockDataProvider>) -> AppState {
    let provider: Arc<dyn DataProvider> = provider;
    AppState::new(test_config(), provider, None)
}

pub fn create_test_app(provider: Arc<MockDataProvider>) -> Router {
    create_app(create_test_state(provider))
}

/// Provider with non-trivial figures in every facet.
pub fn seeded_provider() -> MockDataProvider {
    let mut provider = MockDataProvider::new();
    provider.revenue.total_revenue = 12_450.0;
    provider.revenue.job_count = 83;
    provider.revenue.average_job_value = 150.0;
    provider.revenue.growth_percent = 4.5;
    provider
        .revenue
        .by_service
        .insert("oil_change".to_string(), 2_100.0);
    provider.operations.jobs_completed = 80;
    provider.operations.jobs_in_progress = 3;
    provider.operations.jobs_scheduled = 7;
    provider.customers.total_customers = 64;
    provider.inventory.total_items = 240;
    provider.performance.active_technicians = 6;
    provider
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
