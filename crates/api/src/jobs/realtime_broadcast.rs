//! Periodic push of live shop metrics to realtime subscribers.

use std::sync::Arc;
use std::time::Duration;

use domain::models::RealtimeMetrics;
use domain::services::AggregationEngine;
use metrics::counter;
use tokio::sync::broadcast;
use tracing::debug;

use super::scheduler::{Job, JobFrequency};

/// Job that fetches `RealtimeMetrics` and publishes them on a broadcast channel.
pub struct RealtimeBroadcastJob {
    engine: Arc<AggregationEngine>,
    sender: broadcast::Sender<RealtimeMetrics>,
    interval: Duration,
}

impl RealtimeBroadcastJob {
    pub fn new(
        engine: Arc<AggregationEngine>,
        sender: broadcast::Sender<RealtimeMetrics>,
        interval: Duration,
    ) -> Self {
        Self {
            engine,
            sender,
            interval,
        }
    }
}

#[async_trait::async_trait]
impl Job for RealtimeBroadcastJob {
    fn name(&self) -> &'static str {
        "realtime_broadcast"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Every(self.interval)
    }

    async fn execute(&self) -> Result<(), String> {
        let snapshot = self
            .engine
            .realtime_metrics()
            .await
            .map_err(|e| format!("Failed to fetch realtime metrics: {}", e))?;

        match self.sender.send(snapshot) {
            Ok(receivers) => {
                counter!("realtime_frames_published_total").increment(1);
                debug!(receivers, "Realtime metrics published");
            }
            Err(_) => {
                debug!("No realtime subscribers; snapshot dropped");
            }
        }

        Ok(())
    }
}
