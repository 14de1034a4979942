//! Domain models for shop analytics.

pub mod alert;
pub mod analytics;
pub mod dashboard;
pub mod realtime;
pub mod report;
pub mod time_range;

pub use alert::{
    Alert, AlertKind, AlertSeverity, AlertsResponse, EquipmentSnapshot, EquipmentStatus,
    InventorySnapshot,
};
pub use analytics::{
    AnalyticsBundle, CustomerFacet, Facet, InventoryFacet, OperationsFacet, PerformanceFacet,
    RevenueFacet, TechnicianPerformance, TrendPoint, TrendsFacet,
};
pub use dashboard::{
    CreateDashboardRequest, Dashboard, GridLayout, ListDashboardsResponse,
    UpdateDashboardRequest, Widget, WidgetInput, WidgetKind, WidgetPosition,
};
pub use realtime::{RealtimeFrame, RealtimeMetrics};
pub use report::{
    ExportFormat, ExportReportRequest, ExportReportResponse, GenerateReportRequest,
    ListReportsResponse, Report, ReportType,
};
pub use time_range::{TimeRange, TrendGranularity};
