//! Repository implementations for reports and dashboards.

pub mod dashboard;
pub mod report;

pub use dashboard::DashboardRepository;
pub use report::ReportRepository;
