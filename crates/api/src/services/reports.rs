//! Report generation and export.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domain::models::{ExportFormat, GenerateReportRequest, Report};
use domain::services::AggregationEngine;
use domain::AnalyticsError;
use metrics::counter;
use persistence::repositories::ReportRepository;
use tracing::{info, warn};
use uuid::Uuid;

use super::report_export::ReportExporter;

/// Snapshots analytics bundles into immutable reports.
pub struct ReportStore {
    engine: Arc<AggregationEngine>,
    repository: ReportRepository,
    exporter: Arc<dyn ReportExporter>,
}

impl ReportStore {
    pub fn new(engine: Arc<AggregationEngine>, exporter: Arc<dyn ReportExporter>) -> Self {
        Self {
            engine,
            repository: ReportRepository::new(),
            exporter,
        }
    }

    /// Generates a report from the current bundle for the requested range.
    ///
    /// Fails with `DataUnavailable` when the bundle cannot be computed; nothing
    /// is stored in that case.
    pub async fn generate(&self, request: GenerateReportRequest) -> Result<Report, AnalyticsError> {
        let bundle = self.engine.get_analytics_data(request.range).await?;

        let report = Report {
            id: Uuid::new_v4(),
            name: request.name,
            report_type: request.report_type,
            range: request.range,
            bundle,
            generated_by: request.generated_by,
            generated_at: Utc::now(),
            parameters: request.parameters,
        };

        self.repository.insert(report.clone()).await;
        counter!("reports_generated_total", "type" => report.report_type.as_str()).increment(1);

        info!(
            report_id = %report.id,
            report_type = report.report_type.as_str(),
            range = %report.range,
            generated_by = %report.generated_by,
            "Report generated"
        );

        Ok(report)
    }

    pub async fn get(&self, id: Uuid) -> Result<Report, AnalyticsError> {
        self.repository
            .find_by_id(id)
            .await
            .ok_or_else(|| AnalyticsError::NotFound(format!("Report {} not found", id)))
    }

    /// All reports, newest first.
    pub async fn list(&self) -> Vec<Report> {
        self.repository.list().await
    }

    /// Exports report `id` and returns the filename the artifact was stored
    /// under: `{name}_{YYYY-MM-DD}.{ext}`, with the name made file-safe.
    pub async fn export(&self, id: Uuid, format: ExportFormat) -> Result<String, AnalyticsError> {
        let report = self.get(id).await?;
        let filename = report.export_filename(format);

        match self.exporter.export(&report, format, &filename).await {
            Ok(stored) => {
                counter!("report_exports_total", "format" => format.extension()).increment(1);
                Ok(stored)
            }
            Err(e) => {
                warn!(report_id = %id, format = format.extension(), error = %e, "Report export failed");
                counter!("report_exports_failed_total", "format" => format.extension())
                    .increment(1);
                Err(e)
            }
        }
    }

    /// Drops reports generated before `cutoff`.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let removed = self.repository.delete_generated_before(cutoff).await;
        if removed > 0 {
            info!(removed, cutoff = %cutoff, "Purged expired reports");
        }
        removed
    }

    pub async fn count(&self) -> usize {
        self.repository.count().await
    }
}

impl std::fmt::Debug for ReportStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStore")
            .field("engine", &self.engine)
            .finish()
    }
}
