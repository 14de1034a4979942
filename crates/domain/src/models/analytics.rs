//! Analytics facets and the composite bundle cached per time range.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::time_range::TimeRange;

/// The six analytics categories that make up a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Revenue,
    Operations,
    Customers,
    Inventory,
    Performance,
    Trends,
}

impl Facet {
    pub const ALL: [Facet; 6] = [
        Facet::Revenue,
        Facet::Operations,
        Facet::Customers,
        Facet::Inventory,
        Facet::Performance,
        Facet::Trends,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Revenue => "revenue",
            Facet::Operations => "operations",
            Facet::Customers => "customers",
            Facet::Inventory => "inventory",
            Facet::Performance => "performance",
            Facet::Trends => "trends",
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Facets
// ============================================================================

/// Revenue figures for the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueFacet {
    pub total_revenue: f64,
    pub job_count: i64,
    pub average_job_value: f64,
    /// Change against the preceding window of equal length, in percent.
    pub growth_percent: f64,
    pub by_service: BTreeMap<String, f64>,
}

/// Shop floor throughput.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsFacet {
    pub jobs_completed: i64,
    pub jobs_in_progress: i64,
    pub jobs_scheduled: i64,
    pub average_completion_hours: f64,
    pub bay_utilization_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFacet {
    pub total_customers: i64,
    pub new_customers: i64,
    pub returning_customers: i64,
    pub retention_rate: f64,
    pub average_satisfaction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFacet {
    pub total_items: i64,
    pub low_stock_items: i64,
    pub out_of_stock_items: i64,
    pub inventory_value: f64,
}

/// Per-technician throughput.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianPerformance {
    pub employee_id: String,
    pub name: String,
    pub jobs_completed: i64,
    pub efficiency_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceFacet {
    pub active_technicians: i64,
    pub average_efficiency_percent: f64,
    pub jobs_per_technician: f64,
    pub top_performers: Vec<TechnicianPerformance>,
}

/// A single point of a trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub period_start: DateTime<Utc>,
    pub revenue: f64,
    pub jobs: i64,
    pub new_customers: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsFacet {
    pub points: Vec<TrendPoint>,
}

// ============================================================================
// Bundle
// ============================================================================

/// Composite analytics result for one time range.
///
/// All six facets are produced by the same aggregation pass and are never
/// cached or replaced individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsBundle {
    pub range: TimeRange,
    pub revenue: RevenueFacet,
    pub operations: OperationsFacet,
    pub customers: CustomerFacet,
    pub inventory: InventoryFacet,
    pub performance: PerformanceFacet,
    pub trends: TrendsFacet,
    pub generated_at: DateTime<Utc>,
}

impl AnalyticsBundle {
    /// Bundle with zeroed facets, stamped with the current time.
    pub fn empty(range: TimeRange) -> Self {
        Self {
            range,
            revenue: RevenueFacet::default(),
            operations: OperationsFacet::default(),
            customers: CustomerFacet::default(),
            inventory: InventoryFacet::default(),
            performance: PerformanceFacet::default(),
            trends: TrendsFacet::default(),
            generated_at: Utc::now(),
        }
    }

    /// Flattens scalar facet figures into `(facet, metric, value)` rows.
    ///
    /// Used by tabular exports; trend points and per-technician rows are
    /// emitted with an indexed metric name.
    pub fn metric_rows(&self) -> Vec<(Facet, String, f64)> {
        let mut rows = vec![
            (Facet::Revenue, "totalRevenue".to_string(), self.revenue.total_revenue),
            (Facet::Revenue, "jobCount".to_string(), self.revenue.job_count as f64),
            (Facet::Revenue, "averageJobValue".to_string(), self.revenue.average_job_value),
            (Facet::Revenue, "growthPercent".to_string(), self.revenue.growth_percent),
        ];
        for (service, amount) in &self.revenue.by_service {
            rows.push((Facet::Revenue, format!("byService.{}", service), *amount));
        }

        let ops = &self.operations;
        rows.extend([
            (Facet::Operations, "jobsCompleted".to_string(), ops.jobs_completed as f64),
            (Facet::Operations, "jobsInProgress".to_string(), ops.jobs_in_progress as f64),
            (Facet::Operations, "jobsScheduled".to_string(), ops.jobs_scheduled as f64),
            (Facet::Operations, "averageCompletionHours".to_string(), ops.average_completion_hours),
            (Facet::Operations, "bayUtilizationPercent".to_string(), ops.bay_utilization_percent),
        ]);

        let customers = &self.customers;
        rows.extend([
            (Facet::Customers, "totalCustomers".to_string(), customers.total_customers as f64),
            (Facet::Customers, "newCustomers".to_string(), customers.new_customers as f64),
            (Facet::Customers, "returningCustomers".to_string(), customers.returning_customers as f64),
            (Facet::Customers, "retentionRate".to_string(), customers.retention_rate),
            (Facet::Customers, "averageSatisfaction".to_string(), customers.average_satisfaction),
        ]);

        let inventory = &self.inventory;
        rows.extend([
            (Facet::Inventory, "totalItems".to_string(), inventory.total_items as f64),
            (Facet::Inventory, "lowStockItems".to_string(), inventory.low_stock_items as f64),
            (Facet::Inventory, "outOfStockItems".to_string(), inventory.out_of_stock_items as f64),
            (Facet::Inventory, "inventoryValue".to_string(), inventory.inventory_value),
        ]);

        let perf = &self.performance;
        rows.extend([
            (Facet::Performance, "activeTechnicians".to_string(), perf.active_technicians as f64),
            (Facet::Performance, "averageEfficiencyPercent".to_string(), perf.average_efficiency_percent),
            (Facet::Performance, "jobsPerTechnician".to_string(), perf.jobs_per_technician),
        ]);
        for (i, tech) in perf.top_performers.iter().enumerate() {
            rows.push((
                Facet::Performance,
                format!("topPerformers[{}].{}.jobsCompleted", i, tech.employee_id),
                tech.jobs_completed as f64,
            ));
        }

        for point in &self.trends.points {
            let key = point.period_start.format("%Y-%m-%dT%H:%M").to_string();
            rows.push((Facet::Trends, format!("{}.revenue", key), point.revenue));
            rows.push((Facet::Trends, format!("{}.jobs", key), point.jobs as f64));
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_display() {
        let names: Vec<String> = Facet::ALL.iter().map(|f| f.to_string()).collect();
        assert_eq!(
            names,
            vec!["revenue", "operations", "customers", "inventory", "performance", "trends"]
        );
    }

    #[test]
    fn test_bundle_serializes_camel_case() {
        let mut bundle = AnalyticsBundle::empty(TimeRange::Month);
        bundle.revenue.total_revenue = 1250.5;
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["range"], "month");
        assert_eq!(json["revenue"]["totalRevenue"], 1250.5);
        assert!(json.get("generatedAt").is_some());
        assert!(json["operations"].get("bayUtilizationPercent").is_some());
    }

    #[test]
    fn test_metric_rows_cover_every_scalar_facet() {
        let mut bundle = AnalyticsBundle::empty(TimeRange::Week);
        bundle.revenue.by_service.insert("oil_change".to_string(), 300.0);
        let rows = bundle.metric_rows();

        for facet in [
            Facet::Revenue,
            Facet::Operations,
            Facet::Customers,
            Facet::Inventory,
            Facet::Performance,
        ] {
            assert!(rows.iter().any(|(f, _, _)| *f == facet), "missing {}", facet);
        }
        assert!(rows
            .iter()
            .any(|(_, name, value)| name == "byService.oil_change" && *value == 300.0));
    }
}
