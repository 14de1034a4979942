//! Report generation, lookup and export endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    ExportFormat, ExportReportRequest, ExportReportResponse, GenerateReportRequest,
    ListReportsResponse, Report,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Unparseable ids cannot name a stored report, so they are reported as missing.
fn parse_report_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("Report {} not found", raw)))
}

/// `POST /api/analytics/reports`
pub async fn generate_report(
    State(state): State<AppState>,
    payload: Result<Json<GenerateReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Report>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let report = state.reports.generate(request).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// `GET /api/analytics/reports`
pub async fn list_reports(State(state): State<AppState>) -> Json<ListReportsResponse> {
    let reports = state.reports.list().await;
    Json(ListReportsResponse {
        total: reports.len(),
        reports,
    })
}

/// `GET /api/analytics/reports/:id`
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Report>, ApiError> {
    let id = parse_report_id(&id)?;
    Ok(Json(state.reports.get(id).await?))
}

/// `POST /api/analytics/reports/:id/export`
///
/// Unknown reports are reported before an unsupported format.
pub async fn export_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ExportReportRequest>, JsonRejection>,
) -> Result<Json<ExportReportResponse>, ApiError> {
    let id = parse_report_id(&id)?;
    state.reports.get(id).await?;

    let Json(request) = payload?;
    let format = ExportFormat::parse(&request.format)?;

    let filename = state.reports.export(id, format).await?;
    info!(report_id = %id, filename = %filename, "Report export completed");

    Ok(Json(ExportReportResponse {
        report_id: id,
        format,
        filename,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_report_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_report_id("missing-id"),
            Err(ApiError::NotFound(_))
        ));
    }
}
