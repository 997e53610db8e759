use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::Settings;
use crate::metrics::{self, CreatedAndClosed, MetricsError, Weighting, WeeklyProgress, RATE_WINDOWS};
use crate::models::{Issue, Project};
use crate::time_graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphType {
    /// Progress of every project over the last weeks
    Projects,
    /// Issue burn-up per project
    Issues,
    /// Points per dev-day per project
    Points,
    /// Textual completion prediction
    Completion,
}

/// `graphs/<graph type>_<date>.svg`, lower case with dashes for spaces.
pub fn graph_file(graph_dir: &Path, graph_type: &str, today: NaiveDate) -> PathBuf {
    let file_name = format!("{}_{}.svg", graph_type, today.format(metrics::DATE_FORMAT))
        .replace(' ', "-")
        .to_lowercase();
    graph_dir.join(file_name)
}

pub fn created_and_closed(
    issues: &[Issue],
    settings: &Settings,
    weighting: Weighting,
) -> Result<CreatedAndClosed, MetricsError> {
    metrics::created_and_closed_by_date(issues, &settings.priorities, &settings.done_statuses, weighting)
}

pub fn issues_chart(project: &Project, series: &CreatedAndClosed, today: NaiveDate) -> String {
    let percent = metrics::percent_complete(series.created_total(), series.closed_total());
    let burnup = metrics::burnup(&series.created, &series.closed, today);
    tracing::debug!(
        project = %project.name,
        remaining = burnup.remaining,
        first_closure = ?burnup.first_closure,
        "Burn-up computed"
    );
    time_graph::render_burnup(
        &burnup,
        &format!("{} Issues ({}% Complete)", project.name, percent),
        "Issues",
    )
}

/// `None` for projects without a dev-day allocation.
pub fn points_chart(
    project: &Project,
    issues: &[Issue],
    settings: &Settings,
    today: NaiveDate,
) -> Result<Option<String>, MetricsError> {
    let Some(allocation) = &project.dev_days else {
        return Ok(None);
    };
    let points = created_and_closed(issues, settings, Weighting::StoryPoints)?;
    let dev_days = metrics::devs_per_day(allocation)?;
    let rates = metrics::rolling_rates(&points.closed, &dev_days, today, &RATE_WINDOWS);
    tracing::debug!(project = %project.name, closing_days = rates.closed.len(), "Daily rates computed");
    Ok(Some(time_graph::render_daily_rates(&project.name, &rates, today)))
}

pub fn project_progress(project: &Project, series: &CreatedAndClosed, today: NaiveDate) -> WeeklyProgress {
    metrics::weekly_progress(&series.created, &series.closed, today, project.done)
}

/// Closed and remaining work by points and by stories, with dev-day based estimates.
pub fn predict_completion(
    project: &Project,
    issues: &[Issue],
    settings: &Settings,
    today: NaiveDate,
) -> Result<String, MetricsError> {
    let mut output = String::new();
    let _ = writeln!(output);
    let _ = writeln!(output, "PROJECT: {}", project.name);

    if issues.is_empty() {
        let _ = writeln!(output, "*** NO ISSUES FOUND");
        return Ok(output);
    }

    let dev_days = match &project.dev_days {
        Some(allocation) => {
            if metrics::allocation_is_stale(allocation, today) {
                tracing::warn!(project = %project.name, "Dev days look out of date");
                let _ = writeln!(
                    output,
                    "*** DID YOU FORGET TO UPDATE DEV DAYS FOR {} THIS WEEK?",
                    project.name
                );
            }
            let total = metrics::total_dev_days(allocation)?;
            let _ = writeln!(output, "{} dev-days so far", total);
            total
        }
        None => {
            let _ = writeln!(output, "0 dev-days recorded");
            0
        }
    };
    let _ = writeln!(output, "{}", "-".repeat(20));

    for weighting in [Weighting::StoryPoints, Weighting::IssueCount] {
        let units = weighting.units();
        let series = created_and_closed(issues, settings, weighting)?;
        let estimate = metrics::completion_estimate(series.created_total(), series.closed_total(), dev_days);

        let _ = writeln!(output, "{} {} closed", estimate.closed, units);
        let _ = writeln!(output, "{} {} left", estimate.left, units);
        match (estimate.rate, estimate.dev_days_left, estimate.dev_weeks_left()) {
            (Some(rate), Some(days_left), Some(weeks_left)) => {
                let _ = writeln!(output, "{:.1} {} per dev-day", rate, units);
                let _ = writeln!(
                    output,
                    "BY {}: ~{} dev days left (~{} dev weeks)",
                    units.to_uppercase(),
                    days_left.round(),
                    weeks_left.round()
                );
            }
            _ => {
                let _ = writeln!(output, "BY {}: Cannot predict completion date yet", units.to_uppercase());
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::PriorityFilter;
    use std::collections::{BTreeMap, BTreeSet};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn settings() -> Settings {
        Settings {
            hostname: "jira.example.com".to_string(),
            username: "reporter".to_string(),
            password: "secret".to_string(),
            cache_directory: PathBuf::from("cache"),
            priorities: PriorityFilter::only(["P0", "P1", "P2"]),
            done_statuses: BTreeSet::from(["done".to_string()]),
            story_points_field: "customfield_10005".to_string(),
        }
    }

    fn project(dev_days: Option<BTreeMap<NaiveDate, String>>) -> Project {
        Project {
            name: "Checkout".to_string(),
            query: "project = WEB".to_string(),
            dev_days,
            done: false,
            disabled: false,
        }
    }

    fn issue(key: &str, status: &str, resolved: Option<&str>, points: u64) -> Issue {
        Issue {
            key: key.to_string(),
            issue_type: "Story".to_string(),
            status: status.to_string(),
            priority: Some("P1".to_string()),
            created: "2024-01-01T09:00:00.000+0000".to_string(),
            resolved: resolved.map(str::to_string),
            story_points: Some(points),
        }
    }

    #[test]
    fn graph_file_is_dated_and_slugged() {
        let path = graph_file(Path::new("graphs"), "Checkout daily rates", day(2024, 1, 9));
        assert_eq!(path, PathBuf::from("graphs/checkout-daily-rates_2024-01-09.svg"));
    }

    #[test]
    fn predicts_completion_by_points_and_stories() {
        let allocation = BTreeMap::from([(day(2024, 1, 1), "2,2,2,2,2,0,0".to_string())]);
        let issues = vec![
            issue("A-1", "Done", Some("2024-01-03T10:00:00.000+0000"), 5),
            issue("A-2", "Open", None, 5),
        ];

        let text = predict_completion(&project(Some(allocation)), &issues, &settings(), day(2024, 1, 5)).unwrap();

        assert!(text.contains("PROJECT: Checkout"));
        assert!(text.contains("10 dev-days so far"));
        assert!(text.contains("5 points closed"));
        assert!(text.contains("0.5 points per dev-day"));
        assert!(text.contains("BY POINTS: ~10 dev days left (~2 dev weeks)"));
        assert!(text.contains("1 stories left"));
        assert!(!text.contains("DID YOU FORGET"));
    }

    #[test]
    fn cannot_predict_without_dev_days_or_closures() {
        let issues = vec![issue("A-2", "Open", None, 5)];

        let text = predict_completion(&project(None), &issues, &settings(), day(2024, 1, 5)).unwrap();

        assert!(text.contains("0 dev-days recorded"));
        assert!(text.contains("BY POINTS: Cannot predict completion date yet"));
        assert!(text.contains("BY STORIES: Cannot predict completion date yet"));
    }

    #[test]
    fn reminds_about_stale_dev_days() {
        let allocation = BTreeMap::from([(day(2024, 1, 1), "1,1,1,1,1,0,0".to_string())]);
        let issues = vec![issue("A-2", "Open", None, 5)];

        let text = predict_completion(&project(Some(allocation)), &issues, &settings(), day(2024, 2, 1)).unwrap();

        assert!(text.contains("DID YOU FORGET TO UPDATE DEV DAYS FOR Checkout THIS WEEK?"));
    }

    #[test]
    fn no_issues_short_circuits() {
        let text = predict_completion(&project(None), &[], &settings(), day(2024, 1, 5)).unwrap();
        assert!(text.contains("*** NO ISSUES FOUND"));
    }

    #[test]
    fn points_chart_needs_dev_days() {
        let issues = vec![issue("A-1", "Done", Some("2024-01-03"), 5)];

        assert!(points_chart(&project(None), &issues, &settings(), day(2024, 1, 5)).unwrap().is_none());

        let allocation = BTreeMap::from([(day(2024, 1, 1), "2,2,2,2,2,0,0".to_string())]);
        let chart = points_chart(&project(Some(allocation)), &issues, &settings(), day(2024, 1, 5)).unwrap();
        assert!(chart.unwrap().contains("Checkout Points/Dev-Day"));
    }

    #[test]
    fn issues_chart_shows_percent_complete() {
        let issues = vec![
            issue("A-1", "Done", Some("2024-01-03"), 5),
            issue("A-2", "Open", None, 5),
        ];
        let series = created_and_closed(&issues, &settings(), Weighting::IssueCount).unwrap();

        let svg = issues_chart(&project(None), &series, day(2024, 1, 5));

        assert!(svg.contains("Checkout Issues (50% Complete)"));
    }
}
