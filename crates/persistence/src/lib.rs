//! Persistence layer for the shop analytics service.
//!
//! This crate contains:
//! - Database connection management
//! - Aggregate row entities and the Postgres data provider
//! - In-memory report and dashboard repositories

pub mod data_provider;
pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;

pub use data_provider::PgDataProvider;
