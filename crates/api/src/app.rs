use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use domain::models::RealtimeMetrics;
use domain::services::{AggregationEngine, AlertEvaluator, AnalyticsCache, DataProvider};
use persistence::repositories::DashboardRepository;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{alerts, analytics, dashboards, health, realtime, reports};
use crate::services::{FileReportExporter, ReportStore};

/// Shared state handed to every handler.
///
/// The stores are built once here and live for the whole process.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AggregationEngine>,
    pub reports: Arc<ReportStore>,
    pub dashboards: Arc<DashboardRepository>,
    pub alerts: Arc<AlertEvaluator>,
    pub realtime_tx: broadcast::Sender<RealtimeMetrics>,
    /// `None` when running against a non-database provider.
    pub pool: Option<PgPool>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn DataProvider>, pool: Option<PgPool>) -> Self {
        let analytics = &config.analytics;

        let engine = Arc::new(AggregationEngine::new(
            provider,
            AnalyticsCache::new(analytics.cache_ttl()),
        ));
        let exporter = Arc::new(FileReportExporter::new(analytics.reports_dir()));
        let reports = Arc::new(ReportStore::new(engine.clone(), exporter));
        let alerts = Arc::new(AlertEvaluator::new(analytics.alert_thresholds()));
        let (realtime_tx, _) = broadcast::channel(analytics.broadcast_capacity.max(1));

        Self {
            engine,
            reports,
            dashboards: Arc::new(DashboardRepository::new()),
            alerts,
            realtime_tx,
            pool,
            config: Arc::new(config),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Development default: allow any origin.
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let analytics_routes = Router::new()
        .route("/api/analytics/data", get(analytics::get_analytics_data))
        .route(
            "/api/analytics/reports",
            get(reports::list_reports).post(reports::generate_report),
        )
        .route("/api/analytics/reports/:id", get(reports::get_report))
        .route(
            "/api/analytics/reports/:id/export",
            post(reports::export_report),
        )
        .route(
            "/api/analytics/dashboards",
            get(dashboards::list_dashboards).post(dashboards::create_dashboard),
        )
        .route(
            "/api/analytics/dashboards/:id",
            get(dashboards::get_dashboard).patch(dashboards::update_dashboard),
        )
        .route("/api/analytics/alerts", get(alerts::get_alerts))
        .route("/api/analytics/realtime", get(realtime::realtime_ws));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // The timeout covers the WebSocket handshake only; the upgraded socket
    // runs on its own task.
    Router::new()
        .merge(public_routes)
        .merge(analytics_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
