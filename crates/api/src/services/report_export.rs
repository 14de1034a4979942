//! Report export formatters.
//!
//! Structured (JSON) and tabular (CSV) artifacts are written under the
//! configured reports directory. No document renderer ships with the service,
//! so the document format always fails.

use std::path::{Path, PathBuf};

use domain::models::{ExportFormat, Report};
use domain::AnalyticsError;
use tracing::{debug, info};

/// Produces the artifact for an exported report.
#[async_trait::async_trait]
pub trait ReportExporter: Send + Sync {
    /// Writes `report` in `format` for the requested `filename` and returns
    /// the name the artifact was actually stored under, which may differ
    /// when the requested name is not a safe file name.
    async fn export(
        &self,
        report: &Report,
        format: ExportFormat,
        filename: &str,
    ) -> Result<String, AnalyticsError>;
}

/// Writes export artifacts to a local directory.
#[derive(Debug, Clone)]
pub struct FileReportExporter {
    reports_dir: PathBuf,
}

impl FileReportExporter {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// File name stored for `filename`. The stem is sanitized so report
    /// names cannot escape the reports directory.
    pub fn artifact_name(filename: &str) -> String {
        let (stem, extension) = match filename.rsplit_once('.') {
            Some((stem, extension)) => (stem, Some(extension)),
            None => (filename, None),
        };
        let mut name = shared::validation::sanitize_file_stem(stem);
        if let Some(extension) = extension {
            name.push('.');
            name.push_str(extension);
        }
        name
    }

    pub fn artifact_path(&self, filename: &str) -> PathBuf {
        self.reports_dir.join(Self::artifact_name(filename))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), AnalyticsError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AnalyticsError::ExportFailure(format!("{}: {}", parent.display(), e)))?;
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| AnalyticsError::ExportFailure(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait::async_trait]
impl ReportExporter for FileReportExporter {
    async fn export(
        &self,
        report: &Report,
        format: ExportFormat,
        filename: &str,
    ) -> Result<String, AnalyticsError> {
        let content = match format {
            ExportFormat::Json => to_json(report)?,
            ExportFormat::Csv => to_csv(report),
            ExportFormat::Pdf => {
                return Err(AnalyticsError::ExportFailure(
                    "document export is not supported: no renderer is configured".to_string(),
                ));
            }
        };

        let name = Self::artifact_name(filename);
        let path = self.reports_dir.join(&name);
        debug!(path = %path.display(), bytes = content.len(), "Writing report artifact");
        self.write_file(&path, &content).await?;

        info!(
            report_id = %report.id,
            format = format.extension(),
            path = %path.display(),
            "Report exported"
        );
        Ok(name)
    }
}

/// Serialize the whole report, bundle included.
fn to_json(report: &Report) -> Result<String, AnalyticsError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| AnalyticsError::ExportFailure(format!("serialization failed: {}", e)))
}

/// One row per facet metric.
fn to_csv(report: &Report) -> String {
    let mut csv = String::from("facet,metric,value\n");
    for (facet, metric, value) in report.bundle.metric_rows() {
        csv.push_str(&format!("{},{},{}\n", facet, csv_field(&metric), value));
    }
    csv
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::{AnalyticsBundle, ReportType, TimeRange};
    use uuid::Uuid;

    fn report() -> Report {
        let mut bundle = AnalyticsBundle::empty(TimeRange::Month);
        bundle.revenue.total_revenue = 5150.25;
        bundle
            .revenue
            .by_service
            .insert("tires, alignment".to_string(), 900.0);
        Report {
            id: Uuid::new_v4(),
            name: "Monthly Ops".to_string(),
            report_type: ReportType::Monthly,
            range: TimeRange::Month,
            bundle,
            generated_by: "manager".to_string(),
            generated_at: Utc::now(),
            parameters: None,
        }
    }

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shop-analytics-{}-{}", label, Uuid::new_v4()))
    }

    #[test]
    fn test_artifact_path_sanitizes_stem() {
        let exporter = FileReportExporter::new("/var/reports");
        assert_eq!(
            exporter.artifact_path("Monthly Ops_2024-03-01.json"),
            PathBuf::from("/var/reports/Monthly Ops_2024-03-01.json")
        );
        let escaped = exporter.artifact_path("../../etc/passwd_2024-03-01.csv");
        assert!(escaped.starts_with("/var/reports"));
        assert_eq!(escaped.parent(), Some(Path::new("/var/reports")));
    }

    #[test]
    fn test_csv_has_row_per_metric() {
        let report = report();
        let csv = to_csv(&report);
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("facet,metric,value"));
        assert!(csv.contains("revenue,totalRevenue,5150.25"));
        assert!(csv.contains("revenue,\"byService.tires, alignment\",900"));
        assert_eq!(lines.count(), report.bundle.metric_rows().len());
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a \"b\""), "\"a \"\"b\"\"\"");
    }

    #[tokio::test]
    async fn test_export_json_writes_file() {
        let dir = temp_dir("json");
        let exporter = FileReportExporter::new(&dir);
        let report = report();
        let filename = report.export_filename(ExportFormat::Json);

        let stored = exporter
            .export(&report, ExportFormat::Json, &filename)
            .await
            .unwrap();
        assert_eq!(stored, filename);

        let written = tokio::fs::read_to_string(exporter.artifact_path(&filename))
            .await
            .unwrap();
        let parsed: Report = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, report);

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn test_export_reports_sanitized_name() {
        let dir = temp_dir("sanitized");
        let exporter = FileReportExporter::new(&dir);
        let mut report = report();
        report.name = "Q1/Q2".to_string();
        let requested = report.export_filename(ExportFormat::Csv);

        let stored = exporter
            .export(&report, ExportFormat::Csv, &requested)
            .await
            .unwrap();

        let date = report.generated_at.format("%Y-%m-%d");
        assert_eq!(stored, format!("Q1_Q2_{}.csv", date));
        assert_ne!(stored, requested);
        assert!(dir.join(&stored).exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[test]
    fn test_export_pdf_fails() {
        let exporter = FileReportExporter::new(temp_dir("pdf"));
        let report = report();
        let result = tokio_test::block_on(exporter.export(
            &report,
            ExportFormat::Pdf,
            &report.export_filename(ExportFormat::Pdf),
        ));
        assert!(matches!(result, Err(AnalyticsError::ExportFailure(_))));
    }
}
