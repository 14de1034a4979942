//! Application services layered over the domain engine.

pub mod report_export;
pub mod reports;

pub use report_export::{FileReportExporter, ReportExporter};
pub use reports::ReportStore;
