//! Operational alert endpoint.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::Utc;
use domain::models::{AlertsResponse, TimeRange};
use tracing::debug;

use super::analytics::RangeQuery;
use crate::app::AppState;
use crate::error::ApiError;

/// `GET /api/analytics/alerts?range=<bucket>`; the bucket defaults to `day`.
pub async fn get_alerts(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let Query(query) = query?;
    let range = query.resolve(Some(TimeRange::Day))?;

    let (bundle, inventory, equipment) = tokio::try_join!(
        state.engine.get_analytics_data(range),
        state.engine.inventory_snapshot(),
        state.engine.equipment_snapshot(),
    )?;

    let alerts = state.alerts.evaluate(&bundle, &inventory, &equipment);
    debug!(range = %range, count = alerts.len(), "Alerts evaluated");

    Ok(Json(AlertsResponse {
        total: alerts.len(),
        alerts,
        evaluated_at: Utc::now(),
    }))
}
