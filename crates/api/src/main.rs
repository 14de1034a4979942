use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use shop_analytics_api::app::{create_app, AppState};
use shop_analytics_api::config::Config;
use shop_analytics_api::jobs::{JobScheduler, RealtimeBroadcastJob, ReportRetentionJob};
use shop_analytics_api::middleware;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    middleware::init_logging(&config.logging);
    if let Err(e) = middleware::init_metrics() {
        warn!(error = %e, "Prometheus recorder not installed; /metrics is disabled");
    }

    info!("Starting Shop Analytics API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config())
        .await
        .context("Failed to connect to database")?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let provider = Arc::new(persistence::PgDataProvider::new(pool.clone()));
    let state = AppState::new(config.clone(), provider, Some(pool));

    let mut scheduler = JobScheduler::new();
    scheduler.register(RealtimeBroadcastJob::new(
        state.engine.clone(),
        state.realtime_tx.clone(),
        config.analytics.broadcast_interval(),
    ));
    if config.analytics.report_retention_days > 0 {
        scheduler.register(ReportRetentionJob::new(
            state.reports.clone(),
            config.analytics.report_retention_days,
        ));
    }
    scheduler.start();

    let app = create_app(state);

    let addr = config.socket_addr().context("Invalid server address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler
        .wait_for_shutdown(Duration::from_secs(config.server.shutdown_timeout_secs))
        .await;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        // Without a signal handler there is nothing to wait for.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
