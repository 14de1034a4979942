//! Background job that purges expired reports.

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::scheduler::{Job, JobFrequency};
use crate::services::ReportStore;

/// Deletes reports older than the configured retention period.
pub struct ReportRetentionJob {
    reports: Arc<ReportStore>,
    retention_days: u32,
}

impl ReportRetentionJob {
    pub fn new(reports: Arc<ReportStore>, retention_days: u32) -> Self {
        Self {
            reports,
            retention_days,
        }
    }
}

#[async_trait::async_trait]
impl Job for ReportRetentionJob {
    fn name(&self) -> &'static str {
        "report_retention"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    async fn execute(&self) -> Result<(), String> {
        let cutoff = Utc::now() - Duration::days(i64::from(self.retention_days));
        self.reports.purge_older_than(cutoff).await;
        Ok(())
    }
}
