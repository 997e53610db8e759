//! Turns issue records into per-day series and completion estimates.

pub mod aggregator;
pub mod dev_capacity;
pub mod projection;

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

pub use aggregator::{created_and_closed_by_date, CreatedAndClosed, PriorityFilter, Weighting};
pub use dev_capacity::{allocation_is_stale, devs_per_day, total_dev_days, DevDaySeries};
pub use projection::*;

/// Accumulated units per calendar day. Missing days count as zero.
pub type DateSeries = BTreeMap<NaiveDate, u64>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Issue {0} is done but has no resolution date")]
    MissingResolutionDate(String),
    #[error("Issue {key} has an invalid date {value:?}: {source}")]
    InvalidDate {
        key: String,
        value: String,
        source: chrono::ParseError,
    },
    #[error("Invalid developer allocation {value:?} for week of {week}")]
    InvalidAllocation { week: NaiveDate, value: String },
}

/// Parses the day part of a Jira timestamp such as `2024-01-02T10:11:12.000+0000`.
pub(crate) fn parse_day(key: &str, timestamp: &str) -> Result<NaiveDate, MetricsError> {
    let day = timestamp.get(..10).unwrap_or(timestamp);
    NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|source| MetricsError::InvalidDate {
        key: key.to_string(),
        value: timestamp.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_from_timestamp() {
        let day = parse_day("A-1", "2024-03-09T23:59:59.000-0800").unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn short_timestamp_is_an_error() {
        assert!(parse_day("A-1", "2024-3").is_err());
    }
}
