use crate::metrics::{DateSeries, DevDaySeries};
use chrono::NaiveDate;
use std::collections::{BTreeMap, VecDeque};

/// Trailing windows, in days, used for the points per dev-day lines.
pub const RATE_WINDOWS: [usize; 3] = [28, 14, 7];
pub const ONE_WEEK: i64 = 7;
const MAX_DAYS_WITHOUT_DEVS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    CannotPredict,
    DaysLeft { days_left: u64, sample_days: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Burnup {
    pub created: Vec<(NaiveDate, u64)>,
    pub closed: Vec<(NaiveDate, u64)>,
    pub first_closure: Option<NaiveDate>,
    pub remaining: u64,
    pub projection: Projection,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyRates {
    pub cumulative_closed: Vec<(NaiveDate, u64)>,
    /// Days on which something closed.
    pub closed: Vec<(NaiveDate, u64)>,
    /// Days on which at least one developer worked.
    pub devs: Vec<(NaiveDate, u32)>,
    /// Window length in days mapped to the rate for each day.
    pub rates: BTreeMap<usize, Vec<(NaiveDate, f64)>>,
}

impl DailyRates {
    pub fn final_rate(&self, window: usize) -> f64 {
        self.rates
            .get(&window)
            .and_then(|series| series.last())
            .map(|(_, rate)| *rate)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEstimate {
    pub closed: u64,
    pub left: u64,
    /// Units closed per dev-day. `None` until something closed with dev-days on record.
    pub rate: Option<f64>,
    pub dev_days_left: Option<f64>,
}

impl CompletionEstimate {
    pub fn dev_weeks_left(&self) -> Option<f64> {
        self.dev_days_left.map(|days| days / 5.0)
    }
}

/// Percentages for one project's bar on the all-projects chart.
///
/// Everything is relative to the scope that existed before the current week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyProgress {
    pub new_scope: f64,
    pub remaining: f64,
    /// Index is weeks ago, 4 holding everything older. Cumulative from the oldest week.
    pub done_by_week: [f64; 5],
    pub complete: f64,
}

impl WeeklyProgress {
    fn finished() -> Self {
        Self {
            new_scope: 0.0,
            remaining: 0.0,
            done_by_week: [0.0; 5],
            complete: 100.0,
        }
    }
}

/// Every day from the earliest given day up to and including `today`.
pub fn date_range<'a, I>(days: I, today: NaiveDate) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    let Some(first) = days.into_iter().min().copied() else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|day| *day <= today)
        .collect()
}

fn value_on(series: &DateSeries, day: &NaiveDate) -> u64 {
    series.get(day).copied().unwrap_or(0)
}

pub fn percent_complete(created_total: u64, closed_total: u64) -> f64 {
    if created_total == 0 {
        return 0.0;
    }
    (100.0 * closed_total as f64 / created_total as f64).round()
}

/// Linear projection from the average closure rate since work started.
pub fn project_completion(created_total: u64, closed_total: u64, elapsed_days: i64) -> Projection {
    if closed_total == 0 || elapsed_days <= 0 {
        return Projection::CannotPredict;
    }
    let per_day = closed_total as f64 / elapsed_days as f64;
    let left = created_total.saturating_sub(closed_total);
    Projection::DaysLeft {
        days_left: (left as f64 / per_day).ceil() as u64,
        sample_days: elapsed_days,
    }
}

pub fn burnup(created: &DateSeries, closed: &DateSeries, today: NaiveDate) -> Burnup {
    let dates = date_range(created.keys().chain(closed.keys()), today);

    let mut created_series = Vec::with_capacity(dates.len());
    let mut closed_series = Vec::with_capacity(dates.len());
    let (mut cumulative_created, mut cumulative_closed) = (0, 0);
    for day in dates {
        cumulative_created += value_on(created, &day);
        cumulative_closed += value_on(closed, &day);
        created_series.push((day, cumulative_created));
        closed_series.push((day, cumulative_closed));
    }

    let first_closure = closed.keys().next().copied();
    let projection = match first_closure {
        Some(first) => project_completion(cumulative_created, cumulative_closed, (today - first).num_days()),
        None => Projection::CannotPredict,
    };

    Burnup {
        created: created_series,
        closed: closed_series,
        first_closure,
        remaining: cumulative_created.saturating_sub(cumulative_closed),
        projection,
    }
}

/// Closed units per dev-day over each trailing window.
///
/// A window whose last few days have no developers on record reports 0, which
/// shows up on the chart as a gap in the allocation data.
pub fn rolling_rates(closed: &DateSeries, dev_days: &DevDaySeries, today: NaiveDate, windows: &[usize]) -> DailyRates {
    let mut daily = DailyRates::default();
    let mut running: BTreeMap<usize, (VecDeque<u64>, VecDeque<u32>)> = windows
        .iter()
        .map(|window| (*window, (VecDeque::with_capacity(*window), VecDeque::with_capacity(*window))))
        .collect();

    let mut cumulative_closed = 0;
    for day in date_range(closed.keys().chain(dev_days.keys()), today) {
        let devs = dev_days.get(&day).copied().unwrap_or(0);
        let closed_today = value_on(closed, &day);

        cumulative_closed += closed_today;
        daily.cumulative_closed.push((day, cumulative_closed));

        for (window, (window_closed, window_devs)) in running.iter_mut() {
            if window_closed.len() == *window {
                window_closed.pop_front();
                window_devs.pop_front();
            }
            window_closed.push_back(closed_today);
            window_devs.push_back(devs);

            let recent_devs: u32 = window_devs.iter().rev().take(MAX_DAYS_WITHOUT_DEVS).sum();
            let rate = if recent_devs == 0 {
                0.0
            } else {
                window_closed.iter().sum::<u64>() as f64 / window_devs.iter().sum::<u32>() as f64
            };
            daily.rates.entry(*window).or_default().push((day, rate));
        }

        if closed_today > 0 {
            daily.closed.push((day, closed_today));
        }
        if devs > 0 {
            daily.devs.push((day, devs));
        }
    }

    daily
}

pub fn completion_estimate(created_total: u64, closed_total: u64, dev_days: u64) -> CompletionEstimate {
    let left = created_total.saturating_sub(closed_total);
    let rate = (closed_total > 0 && dev_days > 0).then(|| closed_total as f64 / dev_days as f64);
    CompletionEstimate {
        closed: closed_total,
        left,
        rate,
        dev_days_left: rate.map(|rate| left as f64 / rate),
    }
}

pub fn weekly_progress(created: &DateSeries, closed: &DateSeries, today: NaiveDate, done: bool) -> WeeklyProgress {
    if done {
        return WeeklyProgress::finished();
    }

    let mut created_by_week = [0u64; 5];
    let mut closed_by_week = [0u64; 5];
    for day in date_range(created.keys().chain(closed.keys()), today) {
        let weeks_ago = ((today - day).num_days() / ONE_WEEK).min(4) as usize;
        created_by_week[weeks_ago] += value_on(created, &day);
        closed_by_week[weeks_ago] += value_on(closed, &day);
    }

    let new_total: u64 = created_by_week.iter().sum();
    let old_total = new_total - created_by_week[0];
    let percent_of = |value: u64, total: u64| (100.0 * value as f64 / total as f64).round();

    let mut progress = WeeklyProgress {
        new_scope: 0.0,
        remaining: 0.0,
        done_by_week: [0.0; 5],
        complete: 0.0,
    };
    if new_total > 0 {
        progress.remaining = 100.0;
    }
    if old_total > 0 {
        let mut cumulative = 0.0;
        for week in (0..5).rev() {
            cumulative += percent_of(closed_by_week[week], old_total);
            progress.done_by_week[week] = cumulative;
        }
        progress.new_scope = percent_of(new_total, old_total);
    } else if new_total > 0 {
        progress.done_by_week[0] = percent_of(closed_by_week[0], new_total);
        progress.new_scope = 100.0 - progress.done_by_week[0];
    }
    progress
}
