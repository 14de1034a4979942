//! Background job scheduler and job implementations.

mod realtime_broadcast;
mod report_retention;
mod scheduler;

pub use realtime_broadcast::RealtimeBroadcastJob;
pub use report_retention::ReportRetentionJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
