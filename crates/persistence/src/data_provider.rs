//! Postgres-backed analytics data provider.
//!
//! Each facet is a handful of aggregate queries over the shop tables. Derived
//! figures (averages, growth, retention, efficiency) are computed here from the
//! raw aggregates so the arithmetic can be tested without a database.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use domain::models::{
    CustomerFacet, EquipmentSnapshot, EquipmentStatus, InventoryFacet, InventorySnapshot,
    OperationsFacet, PerformanceFacet, RealtimeMetrics, RevenueFacet, TechnicianPerformance,
    TimeRange, TrendPoint, TrendsFacet,
};
use domain::services::{DataProvider, DataProviderError};
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::entities::{
    CustomerEntity, EquipmentEntity, InventoryEntity, OperationsEntity, RealtimeEntity,
    RevenueTotalsEntity, ServiceRevenueEntity, TechnicianEntity, TrendBucketEntity,
};
use crate::metrics::{record_pool_metrics, QueryTimer};

/// Number of technicians listed in `top_performers`.
pub const TOP_PERFORMER_LIMIT: usize = 5;

const REVENUE_TOTALS_SQL: &str = r#"
    SELECT
        COALESCE(SUM(i.total), 0)::float8 as total_revenue,
        COUNT(DISTINCT i.job_id)::bigint as job_count
    FROM invoices i
    WHERE i.issued_at >= $1 AND i.issued_at < $2
"#;

const REVENUE_BY_SERVICE_SQL: &str = r#"
    SELECT
        j.service_type,
        COALESCE(SUM(i.total), 0)::float8 as revenue
    FROM invoices i
    JOIN service_jobs j ON j.id = i.job_id
    WHERE i.issued_at >= $1 AND i.issued_at < $2
    GROUP BY j.service_type
    ORDER BY j.service_type
"#;

const OPERATIONS_SQL: &str = r#"
    SELECT
        COUNT(*) FILTER (
            WHERE status = 'completed' AND completed_at >= $1 AND completed_at < $2
        )::bigint as jobs_completed,
        COUNT(*) FILTER (WHERE status = 'in_progress')::bigint as jobs_in_progress,
        COUNT(*) FILTER (WHERE status IN ('queued', 'scheduled'))::bigint as jobs_scheduled,
        COALESCE(
            AVG(EXTRACT(EPOCH FROM (completed_at - started_at)) / 3600.0) FILTER (
                WHERE status = 'completed'
                  AND started_at IS NOT NULL
                  AND completed_at >= $1 AND completed_at < $2
            ),
            0
        )::float8 as average_completion_hours,
        (SELECT COUNT(*) FROM service_bays WHERE is_active AND is_occupied)::bigint as occupied_bays,
        (SELECT COUNT(*) FROM service_bays WHERE is_active)::bigint as active_bays
    FROM service_jobs
"#;

const CUSTOMERS_SQL: &str = r#"
    WITH current_customers AS (
        SELECT DISTINCT customer_id FROM service_jobs
        WHERE created_at >= $1 AND created_at < $2
    ),
    previous_customers AS (
        SELECT DISTINCT customer_id FROM service_jobs
        WHERE created_at >= $3 AND created_at < $4
    )
    SELECT
        (SELECT COUNT(*) FROM customers)::bigint as total_customers,
        (SELECT COUNT(*) FROM customers
            WHERE created_at >= $1 AND created_at < $2)::bigint as new_customers,
        (SELECT COUNT(*) FROM current_customers cc
            JOIN customers c ON c.id = cc.customer_id
            WHERE c.created_at < $1)::bigint as returning_customers,
        (SELECT COUNT(*) FROM previous_customers)::bigint as previous_customers,
        (SELECT COUNT(*) FROM previous_customers p
            JOIN current_customers cc ON cc.customer_id = p.customer_id)::bigint as retained_customers,
        (SELECT COALESCE(AVG(customer_rating), 0) FROM service_jobs
            WHERE customer_rating IS NOT NULL
              AND completed_at >= $1 AND completed_at < $2)::float8 as average_satisfaction
"#;

const INVENTORY_SQL: &str = r#"
    SELECT
        COUNT(*)::bigint as total_items,
        COUNT(*) FILTER (WHERE quantity > 0 AND quantity <= reorder_level)::bigint as low_stock_items,
        COUNT(*) FILTER (WHERE quantity <= 0)::bigint as out_of_stock_items,
        COALESCE(SUM(GREATEST(quantity, 0) * unit_cost), 0)::float8 as inventory_value
    FROM inventory_items
"#;

const TECHNICIANS_SQL: &str = r#"
    SELECT
        e.id as employee_id,
        e.name,
        COUNT(j.id)::bigint as jobs_completed,
        COALESCE(SUM(j.estimated_hours), 0)::float8 as estimated_hours,
        COALESCE(SUM(j.actual_hours), 0)::float8 as actual_hours
    FROM employees e
    LEFT JOIN service_jobs j
        ON j.technician_id = e.id
       AND j.status = 'completed'
       AND j.completed_at >= $1 AND j.completed_at < $2
    WHERE e.is_active AND e.role = 'technician'
    GROUP BY e.id, e.name
    ORDER BY jobs_completed DESC, e.name
"#;

const TRENDS_SQL: &str = r#"
    WITH buckets AS (
        SELECT generate_series(
            date_trunc($3::text, $1::timestamptz),
            $2::timestamptz - interval '1 microsecond',
            ('1 ' || $3::text)::interval
        ) as period_start
    )
    SELECT
        b.period_start,
        (SELECT COALESCE(SUM(i.total), 0) FROM invoices i
            WHERE i.issued_at >= GREATEST(b.period_start, $1)
              AND i.issued_at < LEAST(b.period_start + ('1 ' || $3::text)::interval, $2))::float8 as revenue,
        (SELECT COUNT(*) FROM service_jobs j
            WHERE j.status = 'completed'
              AND j.completed_at >= GREATEST(b.period_start, $1)
              AND j.completed_at < LEAST(b.period_start + ('1 ' || $3::text)::interval, $2))::bigint as jobs,
        (SELECT COUNT(*) FROM customers c
            WHERE c.created_at >= GREATEST(b.period_start, $1)
              AND c.created_at < LEAST(b.period_start + ('1 ' || $3::text)::interval, $2))::bigint as new_customers
    FROM buckets b
    ORDER BY b.period_start
"#;

const REALTIME_SQL: &str = r#"
    SELECT
        (SELECT COUNT(*) FROM service_jobs WHERE status = 'in_progress')::bigint as active_jobs,
        (SELECT COUNT(*) FROM service_bays WHERE is_active AND NOT is_occupied)::bigint as available_bays,
        (SELECT COALESCE(SUM(total), 0) FROM invoices WHERE issued_at >= $1)::float8 as today_revenue,
        (SELECT COUNT(*) FROM service_jobs WHERE created_at >= $1)::bigint as today_jobs,
        (SELECT COUNT(*) FROM employees
            WHERE is_active AND clocked_in AND role = 'technician')::bigint as active_technicians,
        (SELECT COUNT(*) FROM service_jobs WHERE status IN ('queued', 'scheduled'))::bigint as queue_length
"#;

const EQUIPMENT_SQL: &str = r#"
    SELECT id, name, is_operational, last_issue
    FROM equipment
    ORDER BY name
"#;

/// Maps an sqlx error onto the provider error taxonomy.
pub fn provider_error(query: &'static str, err: sqlx::Error) -> DataProviderError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            DataProviderError::Unavailable(format!("{}: {}", query, err))
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => DataProviderError::Malformed(format!("{}: {}", query, err)),
        _ => DataProviderError::Query(format!("{}: {}", query, err)),
    }
}

/// Data provider reading aggregates from the shop database.
#[derive(Clone)]
pub struct PgDataProvider {
    pool: PgPool,
}

impl PgDataProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn revenue_totals(
        &self,
        (start, end): (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<RevenueTotalsEntity, DataProviderError> {
        let timer = QueryTimer::new("revenue_totals");
        let result = sqlx::query_as::<_, RevenueTotalsEntity>(REVENUE_TOTALS_SQL)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await;
        timer.finish(&result);
        result.map_err(|e| provider_error("revenue_totals", e))
    }

    async fn revenue_by_service(
        &self,
        (start, end): (DateTime<Utc>, DateTime<Utc>),
    ) -> Result<Vec<ServiceRevenueEntity>, DataProviderError> {
        let timer = QueryTimer::new("revenue_by_service");
        let result = sqlx::query_as::<_, ServiceRevenueEntity>(REVENUE_BY_SERVICE_SQL)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        result.map_err(|e| provider_error("revenue_by_service", e))
    }

    async fn inventory_counts(&self) -> Result<InventoryEntity, DataProviderError> {
        let timer = QueryTimer::new("inventory");
        let result = sqlx::query_as::<_, InventoryEntity>(INVENTORY_SQL)
            .fetch_one(&self.pool)
            .await;
        timer.finish(&result);
        result.map_err(|e| provider_error("inventory", e))
    }
}

impl std::fmt::Debug for PgDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDataProvider")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

#[async_trait::async_trait]
impl DataProvider for PgDataProvider {
    async fn revenue(&self, range: TimeRange) -> Result<RevenueFacet, DataProviderError> {
        let now = Utc::now();
        let (current, previous, by_service) = tokio::try_join!(
            self.revenue_totals(range.window(now)),
            self.revenue_totals(range.previous_window(now)),
            self.revenue_by_service(range.window(now)),
        )?;
        Ok(revenue_facet(&current, &previous, by_service))
    }

    async fn operations(&self, range: TimeRange) -> Result<OperationsFacet, DataProviderError> {
        let (start, end) = range.window(Utc::now());
        let timer = QueryTimer::new("operations");
        let result = sqlx::query_as::<_, OperationsEntity>(OPERATIONS_SQL)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await;
        timer.finish(&result);
        let row = result.map_err(|e| provider_error("operations", e))?;
        Ok(operations_facet(&row))
    }

    async fn customers(&self, range: TimeRange) -> Result<CustomerFacet, DataProviderError> {
        let now = Utc::now();
        let (start, end) = range.window(now);
        let (prev_start, prev_end) = range.previous_window(now);
        let timer = QueryTimer::new("customers");
        let result = sqlx::query_as::<_, CustomerEntity>(CUSTOMERS_SQL)
            .bind(start)
            .bind(end)
            .bind(prev_start)
            .bind(prev_end)
            .fetch_one(&self.pool)
            .await;
        timer.finish(&result);
        let row = result.map_err(|e| provider_error("customers", e))?;
        Ok(customer_facet(&row))
    }

    async fn inventory(&self, _range: TimeRange) -> Result<InventoryFacet, DataProviderError> {
        // Stock levels are a point-in-time figure; the window does not apply.
        let row = self.inventory_counts().await?;
        Ok(InventoryFacet {
            total_items: row.total_items,
            low_stock_items: row.low_stock_items,
            out_of_stock_items: row.out_of_stock_items,
            inventory_value: row.inventory_value,
        })
    }

    async fn performance(&self, range: TimeRange) -> Result<PerformanceFacet, DataProviderError> {
        let (start, end) = range.window(Utc::now());
        let timer = QueryTimer::new("technicians");
        let result = sqlx::query_as::<_, TechnicianEntity>(TECHNICIANS_SQL)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        let rows = result.map_err(|e| provider_error("technicians", e))?;
        Ok(performance_facet(&rows))
    }

    async fn trends(&self, range: TimeRange) -> Result<TrendsFacet, DataProviderError> {
        let (start, end) = range.window(Utc::now());
        let granularity = range.trend_granularity();
        let timer = QueryTimer::new("trends");
        let result = sqlx::query_as::<_, TrendBucketEntity>(TRENDS_SQL)
            .bind(start)
            .bind(end)
            .bind(granularity.as_str())
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        let rows = result.map_err(|e| provider_error("trends", e))?;

        debug!(range = %range, points = rows.len(), "Trend series loaded");

        Ok(TrendsFacet {
            points: rows
                .into_iter()
                .map(|row| TrendPoint {
                    period_start: row.period_start,
                    revenue: row.revenue,
                    jobs: row.jobs,
                    new_customers: row.new_customers,
                })
                .collect(),
        })
    }

    async fn realtime_metrics(&self) -> Result<RealtimeMetrics, DataProviderError> {
        record_pool_metrics(&self.pool);

        let now = Utc::now();
        let (midnight, _) = TimeRange::Day.window(now);
        let timer = QueryTimer::new("realtime");
        let result = sqlx::query_as::<_, RealtimeEntity>(REALTIME_SQL)
            .bind(midnight)
            .fetch_one(&self.pool)
            .await;
        timer.finish(&result);
        let row = result.map_err(|e| provider_error("realtime", e))?;

        Ok(RealtimeMetrics {
            active_jobs: row.active_jobs,
            available_bays: row.available_bays,
            today_revenue: row.today_revenue,
            today_jobs: row.today_jobs,
            active_technicians: row.active_technicians,
            queue_length: row.queue_length,
            timestamp: now,
        })
    }

    async fn inventory_snapshot(&self) -> Result<InventorySnapshot, DataProviderError> {
        let row = self.inventory_counts().await?;
        Ok(inventory_snapshot(&row))
    }

    async fn equipment_snapshot(&self) -> Result<EquipmentSnapshot, DataProviderError> {
        let timer = QueryTimer::new("equipment");
        let result = sqlx::query_as::<_, EquipmentEntity>(EQUIPMENT_SQL)
            .fetch_all(&self.pool)
            .await;
        timer.finish(&result);
        let rows = result.map_err(|e| provider_error("equipment", e))?;

        Ok(EquipmentSnapshot {
            units: rows
                .into_iter()
                .map(|row| EquipmentStatus {
                    id: row.id.to_string(),
                    name: Some(row.name),
                    healthy: Some(row.is_operational),
                    issue: row.last_issue,
                })
                .collect(),
        })
    }
}

// ============================================================================
// Derived figures
// ============================================================================

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

pub(crate) fn revenue_facet(
    current: &RevenueTotalsEntity,
    previous: &RevenueTotalsEntity,
    by_service: Vec<ServiceRevenueEntity>,
) -> RevenueFacet {
    let average_job_value = if current.job_count > 0 {
        current.total_revenue / current.job_count as f64
    } else {
        0.0
    };

    // No baseline means no meaningful growth figure.
    let growth_percent = if previous.total_revenue > 0.0 {
        percent(
            current.total_revenue - previous.total_revenue,
            previous.total_revenue,
        )
    } else {
        0.0
    };

    let by_service: BTreeMap<String, f64> = by_service
        .into_iter()
        .map(|row| (row.service_type, row.revenue))
        .collect();

    RevenueFacet {
        total_revenue: current.total_revenue,
        job_count: current.job_count,
        average_job_value,
        growth_percent,
        by_service,
    }
}

pub(crate) fn operations_facet(row: &OperationsEntity) -> OperationsFacet {
    OperationsFacet {
        jobs_completed: row.jobs_completed,
        jobs_in_progress: row.jobs_in_progress,
        jobs_scheduled: row.jobs_scheduled,
        average_completion_hours: row.average_completion_hours,
        bay_utilization_percent: percent(row.occupied_bays as f64, row.active_bays as f64),
    }
}

pub(crate) fn customer_facet(row: &CustomerEntity) -> CustomerFacet {
    CustomerFacet {
        total_customers: row.total_customers,
        new_customers: row.new_customers,
        returning_customers: row.returning_customers,
        retention_rate: percent(row.retained_customers as f64, row.previous_customers as f64),
        average_satisfaction: row.average_satisfaction,
    }
}

/// Efficiency is estimated over actual hours; technicians without logged
/// hours are excluded from the average.
pub(crate) fn performance_facet(rows: &[TechnicianEntity]) -> PerformanceFacet {
    let active_technicians = rows.len() as i64;
    let total_jobs: i64 = rows.iter().map(|r| r.jobs_completed).sum();

    let efficiencies: Vec<f64> = rows
        .iter()
        .filter(|r| r.actual_hours > 0.0)
        .map(|r| percent(r.estimated_hours, r.actual_hours))
        .collect();
    let average_efficiency_percent = if efficiencies.is_empty() {
        0.0
    } else {
        efficiencies.iter().sum::<f64>() / efficiencies.len() as f64
    };

    let jobs_per_technician = if active_technicians > 0 {
        total_jobs as f64 / active_technicians as f64
    } else {
        0.0
    };

    let top_performers = rows
        .iter()
        .filter(|r| r.jobs_completed > 0)
        .take(TOP_PERFORMER_LIMIT)
        .map(|r| TechnicianPerformance {
            employee_id: r.employee_id.to_string(),
            name: r.name.clone(),
            jobs_completed: r.jobs_completed,
            efficiency_percent: percent(r.estimated_hours, r.actual_hours),
        })
        .collect();

    PerformanceFacet {
        active_technicians,
        average_efficiency_percent,
        jobs_per_technician,
        top_performers,
    }
}

pub(crate) fn inventory_snapshot(row: &InventoryEntity) -> InventorySnapshot {
    let to_count = |value: i64, field: &str| match u64::try_from(value) {
        Ok(count) => Some(count),
        Err(_) => {
            warn!(field, value, "Negative inventory count ignored");
            None
        }
    };

    InventorySnapshot {
        low_stock_count: to_count(row.low_stock_items, "low_stock_items"),
        out_of_stock_count: to_count(row.out_of_stock_items, "out_of_stock_items"),
    }
}
