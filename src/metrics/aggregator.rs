use crate::metrics::{parse_day, DateSeries, MetricsError};
use crate::models::Issue;
use std::collections::BTreeSet;

/// Which priorities count towards the charts. No set means every priority counts.
#[derive(Debug, Clone, Default)]
pub struct PriorityFilter(Option<BTreeSet<String>>);

impl PriorityFilter {
    pub fn any() -> Self {
        Self(None)
    }

    pub fn only<I, S>(priorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Some(priorities.into_iter().map(Into::into).collect()))
    }

    pub fn accepts(&self, priority: Option<&str>) -> bool {
        match (&self.0, priority) {
            (None, _) => true,
            (Some(allowed), Some(priority)) => allowed.contains(priority),
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    IssueCount,
    StoryPoints,
}

impl Weighting {
    pub fn units(&self) -> &'static str {
        match self {
            Weighting::IssueCount => "stories",
            Weighting::StoryPoints => "points",
        }
    }

    fn weight_of(&self, issue: &Issue) -> u64 {
        match self {
            Weighting::IssueCount => 1,
            Weighting::StoryPoints => issue.story_points.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatedAndClosed {
    pub created: DateSeries,
    pub closed: DateSeries,
}

impl CreatedAndClosed {
    pub fn created_total(&self) -> u64 {
        self.created.values().sum()
    }

    pub fn closed_total(&self) -> u64 {
        self.closed.values().sum()
    }
}

/// Buckets issues into created and closed amounts per calendar day.
///
/// `done_statuses` must be lower case; issue statuses are compared case-insensitively.
pub fn created_and_closed_by_date(
    issues: &[Issue],
    priorities: &PriorityFilter,
    done_statuses: &BTreeSet<String>,
    weighting: Weighting,
) -> Result<CreatedAndClosed, MetricsError> {
    let mut series = CreatedAndClosed::default();

    for issue in issues {
        if !priorities.accepts(issue.priority.as_deref()) {
            continue;
        }
        let weight = weighting.weight_of(issue);
        if weight == 0 {
            continue;
        }

        let created = parse_day(&issue.key, &issue.created)?;
        *series.created.entry(created).or_insert(0) += weight;

        if done_statuses.contains(&issue.status.to_lowercase()) {
            let resolved = issue
                .resolved
                .as_deref()
                .ok_or_else(|| MetricsError::MissingResolutionDate(issue.key.clone()))?;
            let closed = parse_day(&issue.key, resolved)?;
            *series.closed.entry(closed).or_insert(0) += weight;
        }
    }

    Ok(series)
}
