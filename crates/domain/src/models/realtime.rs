//! Lightweight live metrics pushed to subscribers on a fixed interval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeMetrics {
    pub active_jobs: i64,
    pub available_bays: i64,
    pub today_revenue: f64,
    pub today_jobs: i64,
    pub active_technicians: i64,
    pub queue_length: i64,
    pub timestamp: DateTime<Utc>,
}

/// Envelope for frames sent on the push channel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeFrame<'a> {
    #[serde(rename = "type")]
    pub frame_type: &'static str,
    pub data: &'a RealtimeMetrics,
}

impl<'a> RealtimeFrame<'a> {
    pub fn metrics(data: &'a RealtimeMetrics) -> Self {
        Self {
            frame_type: "realtime_metrics",
            data,
        }
    }
}
