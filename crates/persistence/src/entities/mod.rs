//! Database entity definitions.
//!
//! Entities represent rows returned by the aggregate queries over shop tables.

pub mod analytics;

pub use analytics::*;
