//! Time range buckets used as the analytics cache and aggregation key.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// Coarse time-range granularity for analytics queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// Grouping unit for trend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendGranularity {
    Hour,
    Day,
    Week,
    Month,
}

impl TrendGranularity {
    /// Unit name accepted by Postgres `date_trunc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendGranularity::Hour => "hour",
            TrendGranularity::Day => "day",
            TrendGranularity::Week => "week",
            TrendGranularity::Month => "month",
        }
    }
}

impl TimeRange {
    /// Every bucket, in ascending span order.
    pub const ALL: [TimeRange; 5] = [
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Quarter,
        TimeRange::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Quarter => "quarter",
            TimeRange::Year => "year",
        }
    }

    /// Parses a bucket name, rejecting anything outside the fixed set.
    pub fn parse(s: &str) -> Result<Self, AnalyticsError> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(TimeRange::Day),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            other => Err(AnalyticsError::Validation(format!(
                "Invalid time range '{}': expected one of day, week, month, quarter, year",
                other
            ))),
        }
    }

    /// Returns the `[start, end)` window this bucket covers, ending at `now`.
    ///
    /// `Day` starts at UTC midnight; the other buckets are rolling windows
    /// of 7, 30, 90 and 365 days.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = match self {
            TimeRange::Day => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc())
                .unwrap_or(now - Duration::days(1)),
            TimeRange::Week => now - Duration::days(7),
            TimeRange::Month => now - Duration::days(30),
            TimeRange::Quarter => now - Duration::days(90),
            TimeRange::Year => now - Duration::days(365),
        };
        (start, now)
    }

    /// The window immediately preceding [`TimeRange::window`], used for growth figures.
    pub fn previous_window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let (start, end) = self.window(now);
        let span = end - start;
        (start - span, start)
    }

    pub fn trend_granularity(&self) -> TrendGranularity {
        match self {
            TimeRange::Day => TrendGranularity::Hour,
            TimeRange::Week | TimeRange::Month => TrendGranularity::Day,
            TimeRange::Quarter => TrendGranularity::Week,
            TimeRange::Year => TrendGranularity::Month,
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TimeRange {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_range_parse() {
        assert_eq!(TimeRange::parse("day").unwrap(), TimeRange::Day);
        assert_eq!(TimeRange::parse("Month").unwrap(), TimeRange::Month);
        assert_eq!(" year ".parse::<TimeRange>().unwrap(), TimeRange::Year);
    }

    #[test]
    fn test_time_range_parse_rejects_custom_ranges() {
        let err = TimeRange::parse("fortnight").unwrap_err();
        assert!(matches!(err, AnalyticsError::Validation(_)));
        assert!(err.to_string().contains("fortnight"));
    }

    #[test]
    fn test_time_range_serialization() {
        assert_eq!(serde_json::to_string(&TimeRange::Quarter).unwrap(), "\"quarter\"");
        let range: TimeRange = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(range, TimeRange::Week);
        assert!(serde_json::from_str::<TimeRange>("\"decade\"").is_err());
    }

    #[test]
    fn test_day_window_starts_at_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
        let (start, end) = TimeRange::Day.window(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
        assert_eq!(end, now);
    }

    #[test]
    fn test_rolling_windows() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(TimeRange::Week.window(now).0, now - Duration::days(7));
        assert_eq!(TimeRange::Quarter.window(now).0, now - Duration::days(90));

        let (prev_start, prev_end) = TimeRange::Month.previous_window(now);
        assert_eq!(prev_end, now - Duration::days(30));
        assert_eq!(prev_start, now - Duration::days(60));
    }

    #[test]
    fn test_trend_granularity() {
        assert_eq!(TimeRange::Day.trend_granularity().as_str(), "hour");
        assert_eq!(TimeRange::Month.trend_granularity().as_str(), "day");
        assert_eq!(TimeRange::Year.trend_granularity().as_str(), "month");
    }
}
