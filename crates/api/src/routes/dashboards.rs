//! Dashboard definition endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    CreateDashboardRequest, Dashboard, ListDashboardsResponse, UpdateDashboardRequest,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

fn parse_dashboard_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("Dashboard {} not found", raw)))
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Dashboard {} not found", id))
}

/// `GET /api/analytics/dashboards`
pub async fn list_dashboards(State(state): State<AppState>) -> Json<ListDashboardsResponse> {
    let dashboards = state.dashboards.list().await;
    Json(ListDashboardsResponse {
        total: dashboards.len(),
        dashboards,
    })
}

/// `POST /api/analytics/dashboards`
pub async fn create_dashboard(
    State(state): State<AppState>,
    payload: Result<Json<CreateDashboardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Dashboard>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let dashboard = state.dashboards.create(request).await;
    info!(
        dashboard_id = %dashboard.id,
        widgets = dashboard.widgets.len(),
        created_by = %dashboard.created_by,
        "Dashboard created"
    );

    Ok((StatusCode::CREATED, Json(dashboard)))
}

/// `GET /api/analytics/dashboards/:id`
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Dashboard>, ApiError> {
    let id = parse_dashboard_id(&id)?;
    state
        .dashboards
        .find_by_id(id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// `PATCH /api/analytics/dashboards/:id`
pub async fn update_dashboard(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDashboardRequest>, JsonRejection>,
) -> Result<Json<Dashboard>, ApiError> {
    let id = parse_dashboard_id(&id)?;
    let Json(request) = payload?;
    request.validate()?;

    let updated = state
        .dashboards
        .update(id, request)
        .await?
        .ok_or_else(|| not_found(id))?;

    info!(dashboard_id = %id, "Dashboard updated");
    Ok(Json(updated))
}
