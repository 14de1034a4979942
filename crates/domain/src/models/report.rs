//! Report domain models.
//!
//! A report is an immutable point-in-time snapshot of an analytics bundle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use super::analytics::AnalyticsBundle;
use super::time_range::TimeRange;
use crate::error::AnalyticsError;

/// Report cadence label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
    Custom,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Daily => "daily",
            ReportType::Weekly => "weekly",
            ReportType::Monthly => "monthly",
            ReportType::Quarterly => "quarterly",
            ReportType::Annual => "annual",
            ReportType::Custom => "custom",
        }
    }
}

/// Export format for report artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Structured data.
    Json,
    /// Tabular data.
    Csv,
    /// Rendered document.
    Pdf,
}

impl ExportFormat {
    /// Parses a format name; accepts the extension or the intent name.
    pub fn parse(s: &str) -> Result<Self, AnalyticsError> {
        match s.trim().to_lowercase().as_str() {
            "json" | "structured" => Ok(ExportFormat::Json),
            "csv" | "tabular" | "excel" => Ok(ExportFormat::Csv),
            "pdf" | "document" => Ok(ExportFormat::Pdf),
            other => Err(AnalyticsError::Validation(format!(
                "Unsupported export format '{}'",
                other
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// A generated analytics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub range: TimeRange,
    pub bundle: AnalyticsBundle,
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HashMap<String, serde_json::Value>>,
}

impl Report {
    /// Deterministic export filename: `{name}_{YYYY-MM-DD}.{ext}`.
    pub fn export_filename(&self, format: ExportFormat) -> String {
        format!(
            "{}_{}.{}",
            self.name,
            self.generated_at.format("%Y-%m-%d"),
            format.extension()
        )
    }
}

/// Request payload for generating a report.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    pub report_type: ReportType,

    pub range: TimeRange,

    #[validate(length(min = 1, max = 100, message = "generatedBy must be 1-100 characters"))]
    pub generated_by: String,

    #[serde(default)]
    pub parameters: Option<HashMap<String, serde_json::Value>>,
}

/// Request payload for exporting a report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReportRequest {
    pub format: String,
}

/// Response payload for an export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReportResponse {
    pub report_id: Uuid,
    pub format: ExportFormat,
    pub filename: String,
}

/// Response for listing reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsResponse {
    pub reports: Vec<Report>,
    pub total: usize,
}
