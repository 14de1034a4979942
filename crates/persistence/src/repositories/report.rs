//! In-memory report repository.
//!
//! Reports live for the lifetime of the process unless purged by retention.

use chrono::{DateTime, Utc};
use domain::models::Report;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository of generated reports, kept in insertion order.
#[derive(Debug, Default)]
pub struct ReportRepository {
    reports: RwLock<Vec<Report>>,
}

impl ReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, report: Report) {
        self.reports.write().await.push(report);
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<Report> {
        self.reports
            .read()
            .await
            .iter()
            .find(|report| report.id == id)
            .cloned()
    }

    /// All reports, newest first. Reports with equal timestamps keep their
    /// insertion order.
    pub async fn list(&self) -> Vec<Report> {
        let mut reports = self.reports.read().await.clone();
        reports.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        reports
    }

    /// Removes reports generated before `cutoff`. Returns how many were removed.
    pub async fn delete_generated_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut reports = self.reports.write().await;
        let before = reports.len();
        reports.retain(|report| report.generated_at >= cutoff);
        before - reports.len()
    }

    pub async fn count(&self) -> usize {
        self.reports.read().await.len()
    }
}
