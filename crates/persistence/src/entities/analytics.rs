//! Aggregate row entities for the analytics queries.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice totals over a window.
#[derive(Debug, Clone, FromRow)]
pub struct RevenueTotalsEntity {
    pub total_revenue: f64,
    pub job_count: i64,
}

/// Revenue grouped by service type.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRevenueEntity {
    pub service_type: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct OperationsEntity {
    pub jobs_completed: i64,
    pub jobs_in_progress: i64,
    pub jobs_scheduled: i64,
    pub average_completion_hours: f64,
    pub occupied_bays: i64,
    pub active_bays: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerEntity {
    pub total_customers: i64,
    pub new_customers: i64,
    pub returning_customers: i64,
    /// Customers served in the previous window.
    pub previous_customers: i64,
    /// Customers served in both the previous and current window.
    pub retained_customers: i64,
    pub average_satisfaction: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct InventoryEntity {
    pub total_items: i64,
    pub low_stock_items: i64,
    pub out_of_stock_items: i64,
    pub inventory_value: f64,
}

/// Completed work per active technician.
#[derive(Debug, Clone, FromRow)]
pub struct TechnicianEntity {
    pub employee_id: Uuid,
    pub name: String,
    pub jobs_completed: i64,
    pub estimated_hours: f64,
    pub actual_hours: f64,
}

/// One bucket of the trend series.
#[derive(Debug, Clone, FromRow)]
pub struct TrendBucketEntity {
    pub period_start: DateTime<Utc>,
    pub revenue: f64,
    pub jobs: i64,
    pub new_customers: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct RealtimeEntity {
    pub active_jobs: i64,
    pub available_bays: i64,
    pub today_revenue: f64,
    pub today_jobs: i64,
    pub active_technicians: i64,
    pub queue_length: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EquipmentEntity {
    pub id: Uuid,
    pub name: String,
    pub is_operational: bool,
    pub last_issue: Option<String>,
}
