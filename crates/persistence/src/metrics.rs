//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record the duration of an analytics query.
pub fn record_query_duration(query_name: &'static str, outcome: &'static str, duration_secs: f64) {
    histogram!(
        "data_provider_query_duration_seconds",
        "query" => query_name,
        "outcome" => outcome
    )
    .record(duration_secs);
}

/// Record database connection pool metrics.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one provider query and records it with its outcome.
///
/// ```ignore
/// let timer = QueryTimer::new("revenue_totals");
/// let result = sqlx::query_as::<_, RevenueTotalsEntity>(...).fetch_one(&pool).await;
/// timer.finish(&result);
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn query_name(&self) -> &'static str {
        self.query_name
    }

    /// Record the elapsed duration labelled `ok` or `error`.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        let outcome = if result.is_ok() { "ok" } else { "error" };
        record_query_duration(self.query_name, outcome, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_name() {
        let timer = QueryTimer::new("revenue_totals");
        assert_eq!(timer.query_name(), "revenue_totals");
    }

    #[test]
    fn test_query_timer_finish_without_recorder() {
        // No recorder installed: recording is a no-op and must not panic.
        let ok: Result<(), ()> = Ok(());
        QueryTimer::new("ok_query").finish(&ok);
        let err: Result<(), &str> = Err("boom");
        QueryTimer::new("failed_query").finish(&err);
    }
}
