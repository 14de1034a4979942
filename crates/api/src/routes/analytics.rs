//! Analytics bundle endpoint.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use domain::models::{AnalyticsBundle, TimeRange};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;

/// Query string carrying a time bucket.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

impl RangeQuery {
    /// Parsed bucket; absent means an error unless a default is supplied.
    pub fn resolve(&self, default: Option<TimeRange>) -> Result<TimeRange, ApiError> {
        match (&self.range, default) {
            (Some(raw), _) => Ok(TimeRange::parse(raw)?),
            (None, Some(range)) => Ok(range),
            (None, None) => Err(ApiError::Validation(
                "Query parameter 'range' is required".to_string(),
            )),
        }
    }
}

/// `GET /api/analytics/data?range=<bucket>`
pub async fn get_analytics_data(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<AnalyticsBundle>, ApiError> {
    let Query(query) = query?;
    let range = query.resolve(None)?;

    let bundle = state.engine.get_analytics_data(range).await?;
    Ok(Json(bundle))
}
