//! Domain error types for analytics operations.

use thiserror::Error;

use crate::services::DataProviderError;

/// Errors surfaced by the aggregation, report and export paths.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A provider fetch failed; nothing was cached for the bucket.
    #[error("Analytics data unavailable: {facet} fetch failed: {source}")]
    DataUnavailable {
        facet: &'static str,
        #[source]
        source: DataProviderError,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Artifact generation failed; no filename is returned.
    #[error("Export failed: {0}")]
    ExportFailure(String),
}

impl AnalyticsError {
    pub fn data_unavailable(facet: &'static str, source: DataProviderError) -> Self {
        AnalyticsError::DataUnavailable { facet, source }
    }
}
