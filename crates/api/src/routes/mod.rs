//! HTTP route handlers.

pub mod alerts;
pub mod analytics;
pub mod dashboards;
pub mod health;
pub mod realtime;
pub mod reports;
