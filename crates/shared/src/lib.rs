//! Shared utilities for the shop analytics backend.
//!
//! This crate provides common functionality used across the other crates:
//! - Validation helpers for dashboard layouts and widget definitions
//! - File name helpers for exported artifacts

pub mod validation;
