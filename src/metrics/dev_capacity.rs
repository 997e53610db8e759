use crate::metrics::MetricsError;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Developers working on each calendar day.
pub type DevDaySeries = BTreeMap<NaiveDate, u32>;

fn parse_week(week: NaiveDate, allocation: &str) -> Result<Vec<u32>, MetricsError> {
    allocation
        .split(',')
        .map(|devs| {
            devs.trim().parse::<u32>().map_err(|_| MetricsError::InvalidAllocation {
                week,
                value: allocation.to_string(),
            })
        })
        .collect()
}

/// Expands weekly allocations into one entry per day.
///
/// Days before the first day with developers are left out, since a project does not
/// necessarily start on a week boundary. Zero days after that point are kept.
pub fn devs_per_day(allocation: &BTreeMap<NaiveDate, String>) -> Result<DevDaySeries, MetricsError> {
    let mut dev_days = DevDaySeries::new();
    let mut has_begun = false;

    for (week_start, week_allocation) in allocation {
        for (offset, devs) in parse_week(*week_start, week_allocation)?.into_iter().enumerate() {
            has_begun = has_begun || devs > 0;
            if has_begun {
                dev_days.insert(*week_start + Duration::days(offset as i64), devs);
            }
        }
    }

    Ok(dev_days)
}

pub fn total_dev_days(allocation: &BTreeMap<NaiveDate, String>) -> Result<u64, MetricsError> {
    let mut total = 0u64;
    for (week_start, week_allocation) in allocation {
        total += parse_week(*week_start, week_allocation)?
            .into_iter()
            .map(u64::from)
            .sum::<u64>();
    }
    Ok(total)
}

/// True when the newest allocated week started more than a week before `today`.
pub fn allocation_is_stale(allocation: &BTreeMap<NaiveDate, String>, today: NaiveDate) -> bool {
    allocation
        .keys()
        .next_back()
        .is_some_and(|latest| (today - *latest).num_days() > 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn allocation(weeks: &[(NaiveDate, &str)]) -> BTreeMap<NaiveDate, String> {
        weeks.iter().map(|(week, devs)| (*week, devs.to_string())).collect()
    }

    #[test]
    fn starts_recording_on_first_working_day() {
        let raw = allocation(&[(day(2024, 1, 1), "0,0,3,2,1,0,0")]);

        let series = devs_per_day(&raw).unwrap();

        assert_eq!(series.keys().next(), Some(&day(2024, 1, 3)));
        assert_eq!(series.get(&day(2024, 1, 3)), Some(&3));
        assert_eq!(series.get(&day(2024, 1, 4)), Some(&2));
        assert_eq!(series.get(&day(2024, 1, 5)), Some(&1));
        assert_eq!(series.get(&day(2024, 1, 7)), Some(&0));
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn weeks_are_processed_in_date_order() {
        let raw = allocation(&[
            (day(2024, 1, 15), "1,1,1,1,1,0,0"),
            (day(2024, 1, 1), "0,0,0,0,0,0,0"),
            (day(2024, 1, 8), "0,0,0,0,2,0,0"),
        ]);

        let series = devs_per_day(&raw).unwrap();

        assert_eq!(series.keys().next(), Some(&day(2024, 1, 12)));
        assert_eq!(series.get(&day(2024, 1, 12)), Some(&2));
        assert_eq!(series.get(&day(2024, 1, 13)), Some(&0));
        assert_eq!(series.get(&day(2024, 1, 15)), Some(&1));
        assert_eq!(series.len(), 10);
    }

    #[test]
    fn all_zero_allocation_is_empty() {
        let raw = allocation(&[(day(2024, 1, 1), "0,0,0,0,0,0,0")]);
        assert!(devs_per_day(&raw).unwrap().is_empty());
    }

    #[test]
    fn allocation_tolerates_spaces() {
        let raw = allocation(&[(day(2024, 1, 1), "2, 2, 2")]);
        assert_eq!(devs_per_day(&raw).unwrap().len(), 3);
    }

    #[test]
    fn rejects_non_numeric_allocation() {
        let raw = allocation(&[(day(2024, 1, 1), "1,x,1")]);
        assert!(matches!(
            devs_per_day(&raw),
            Err(MetricsError::InvalidAllocation { week, .. }) if week == day(2024, 1, 1)
        ));
    }

    #[test]
    fn totals_every_allocated_day() {
        let raw = allocation(&[(day(2024, 1, 1), "0,0,3,2,1,0,0"), (day(2024, 1, 8), "2,2,2,2,2,0,0")]);
        assert_eq!(total_dev_days(&raw).unwrap(), 16);
    }

    #[test]
    fn detects_stale_allocation() {
        let raw = allocation(&[(day(2024, 1, 1), "1,1,1,1,1,0,0")]);
        assert!(!allocation_is_stale(&raw, day(2024, 1, 8)));
        assert!(allocation_is_stale(&raw, day(2024, 1, 9)));
        assert!(!allocation_is_stale(&BTreeMap::new(), day(2024, 1, 9)));
    }
}
