//! Threshold-based alert evaluation.

use crate::models::{
    Alert, AlertKind, AlertSeverity, AnalyticsBundle, EquipmentSnapshot, InventorySnapshot,
};

/// Thresholds applied by [`AlertEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Alert when more items than this are below their reorder level.
    pub low_stock_threshold: u64,
    /// Alert when revenue growth is at or below this percentage (negative).
    pub revenue_drop_threshold_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            low_stock_threshold: 5,
            revenue_drop_threshold_percent: -20.0,
        }
    }
}

/// Deterministic alert evaluator.
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluates the latest bundle and current shop state.
    ///
    /// Missing snapshot fields never produce an alert.
    pub fn evaluate(
        &self,
        bundle: &AnalyticsBundle,
        inventory: &InventorySnapshot,
        equipment: &EquipmentSnapshot,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if let Some(low_stock) = inventory.low_stock_count {
            if low_stock > self.thresholds.low_stock_threshold {
                alerts.push(Alert::new(
                    AlertKind::Warning,
                    AlertSeverity::Medium,
                    format!("{} items are running low on stock", low_stock),
                ));
            }
        }

        if let Some(out_of_stock) = inventory.out_of_stock_count {
            if out_of_stock > 0 {
                alerts.push(Alert::new(
                    AlertKind::Warning,
                    AlertSeverity::High,
                    format!("{} items are out of stock", out_of_stock),
                ));
            }
        }

        for unit in &equipment.units {
            if unit.healthy != Some(false) {
                continue;
            }
            let name = unit.name.as_deref().unwrap_or(&unit.id);
            let message = match unit.issue.as_deref() {
                Some(issue) if !issue.is_empty() => {
                    format!("Equipment '{}' requires attention: {}", name, issue)
                }
                _ => format!("Equipment '{}' requires attention", name),
            };
            alerts.push(Alert::new(AlertKind::Error, AlertSeverity::High, message));
        }

        let growth = bundle.revenue.growth_percent;
        if growth.is_finite() && growth <= self.thresholds.revenue_drop_threshold_percent {
            alerts.push(Alert::new(
                AlertKind::Info,
                AlertSeverity::Low,
                format!(
                    "Revenue is down {:.1}% against the previous {}",
                    growth.abs(),
                    bundle.range
                ),
            ));
        }

        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquipmentStatus, TimeRange};

    fn bundle() -> AnalyticsBundle {
        AnalyticsBundle::empty(TimeRange::Day)
    }

    fn unit(id: &str, healthy: Option<bool>, issue: Option<&str>) -> EquipmentStatus {
        EquipmentStatus {
            id: id.to_string(),
            name: None,
            healthy,
            issue: issue.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_snapshots_produce_no_alerts() {
        let evaluator = AlertEvaluator::default();
        let alerts = evaluator.evaluate(
            &bundle(),
            &InventorySnapshot::default(),
            &EquipmentSnapshot::default(),
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_low_stock_over_threshold() {
        let evaluator = AlertEvaluator::default();
        let inventory = InventorySnapshot {
            low_stock_count: Some(6),
            out_of_stock_count: None,
        };
        let alerts = evaluator.evaluate(&bundle(), &inventory, &EquipmentSnapshot::default());

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Warning);
        assert_eq!(alerts[0].severity, AlertSeverity::Medium);
        assert!(alerts[0].message.contains('6'));
    }

    #[test]
    fn test_low_stock_at_threshold_is_quiet() {
        let evaluator = AlertEvaluator::default();
        let inventory = InventorySnapshot {
            low_stock_count: Some(5),
            out_of_stock_count: Some(0),
        };
        assert!(evaluator
            .evaluate(&bundle(), &inventory, &EquipmentSnapshot::default())
            .is_empty());
    }

    #[test]
    fn test_failing_equipment_emits_error_per_unit() {
        let evaluator = AlertEvaluator::default();
        let equipment = EquipmentSnapshot {
            units: vec![
                unit("lift-1", Some(false), Some("hydraulic leak")),
                unit("lift-2", Some(true), None),
                unit("compressor", Some(false), None),
                unit("scanner", None, Some("unknown")),
            ],
        };
        let alerts = evaluator.evaluate(&bundle(), &InventorySnapshot::default(), &equipment);

        assert_eq!(alerts.len(), 2);
        assert!(alerts
            .iter()
            .all(|a| a.kind == AlertKind::Error && a.severity == AlertSeverity::High));
        assert!(alerts[0].message.contains("hydraulic leak"));
        assert!(alerts[1].message.contains("compressor"));
    }

    #[test]
    fn test_revenue_drop_info_alert() {
        let evaluator = AlertEvaluator::new(AlertThresholds {
            low_stock_threshold: 10,
            revenue_drop_threshold_percent: -15.0,
        });
        let mut bundle = bundle();
        bundle.revenue.growth_percent = -32.5;

        let alerts = evaluator.evaluate(
            &bundle,
            &InventorySnapshot::default(),
            &EquipmentSnapshot::default(),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Info);
        assert_eq!(alerts[0].severity, AlertSeverity::Low);
        assert!(alerts[0].message.contains("32.5%"));
    }

    #[test]
    fn test_non_finite_growth_is_ignored() {
        let evaluator = AlertEvaluator::default();
        let mut bundle = bundle();
        bundle.revenue.growth_percent = f64::NEG_INFINITY;
        assert!(evaluator
            .evaluate(
                &bundle,
                &InventorySnapshot::default(),
                &EquipmentSnapshot::default()
            )
            .is_empty());
    }
}
