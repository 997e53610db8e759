use crate::metrics::WeeklyProgress;
use crate::renderer::{GraphStyle, Renderer};
use std::collections::BTreeMap;

const WIDTH: i32 = 640;
const HEIGHT: i32 = 360;
const MARGIN: i32 = 70;
const BAR_WIDTH: f64 = 0.7;
const GRID_WIDTH: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    NewThisWeek,
    RemainLastWeek,
    /// Closed this many weeks ago, 4 covering everything older.
    DoneWeeksAgo(usize),
    Complete,
}

impl ProgressBand {
    pub fn color(&self) -> &'static str {
        match self {
            ProgressBand::NewThisWeek => "#ff7043",
            ProgressBand::RemainLastWeek => "#dddddd",
            ProgressBand::DoneWeeksAgo(0) => "#99bad7",
            ProgressBand::DoneWeeksAgo(1) => "#6a93b9",
            ProgressBand::DoneWeeksAgo(2) => "#2a5e8d",
            ProgressBand::DoneWeeksAgo(3) => "#073763",
            ProgressBand::DoneWeeksAgo(_) => "#011a30",
            ProgressBand::Complete => "#33cc33",
        }
    }

    pub fn label(&self) -> String {
        match self {
            ProgressBand::NewThisWeek => "New This Week".to_string(),
            ProgressBand::RemainLastWeek => "Remain Last Week".to_string(),
            ProgressBand::DoneWeeksAgo(0) => "Done This Week".to_string(),
            ProgressBand::DoneWeeksAgo(1) => "1 Week Ago".to_string(),
            ProgressBand::DoneWeeksAgo(weeks) => format!("{} Weeks Ago", weeks),
            ProgressBand::Complete => "Complete".to_string(),
        }
    }
}

/// Bars in drawing order. Each bar starts at zero, so later bars cover earlier ones.
pub fn bands(progress: &WeeklyProgress) -> Vec<(ProgressBand, f64)> {
    let mut bands = vec![
        (ProgressBand::NewThisWeek, progress.new_scope),
        (ProgressBand::RemainLastWeek, progress.remaining),
    ];
    bands.extend(
        progress
            .done_by_week
            .iter()
            .enumerate()
            .map(|(weeks_ago, done)| (ProgressBand::DoneWeeksAgo(weeks_ago), *done)),
    );
    bands.push((ProgressBand::Complete, progress.complete));
    bands
}

/// One stacked bar per project, 100 marking the scope as of last week.
pub fn render_projects(all_progress: &BTreeMap<String, WeeklyProgress>) -> String {
    let max_value = all_progress
        .values()
        .flat_map(|progress| bands(progress).into_iter().map(|(_, value)| value))
        .fold(100.0, f64::max)
        * 1.05;
    let y = |value: f64| HEIGHT as f64 - value.max(0.0) / max_value * HEIGHT as f64;

    let mut renderer = Renderer::new(WIDTH, HEIGHT, MARGIN).title("All Projects");

    let mut grid = GRID_WIDTH;
    while grid < max_value {
        renderer = renderer.horizontal_line(y(grid), "#e9e9e9", 1.0, None);
        grid += GRID_WIDTH;
    }

    let slot = WIDTH as f64 / all_progress.len().max(1) as f64;
    for (index, (project_name, progress)) in all_progress.iter().enumerate() {
        let x = slot * (index as f64 + 0.5);
        for (band, value) in bands(progress) {
            renderer = renderer.bar(x, slot * BAR_WIDTH, y(value), y(0.0), band.color());
        }
        renderer = renderer.x_label(x, project_name);
    }

    renderer = renderer.horizontal_line(y(100.0), "black", 2.0, Some("6 3"));
    if let Some(progress) = all_progress.values().next() {
        for (band, _) in bands(progress) {
            renderer = renderer.legend(&band.label(), &GraphStyle::solid(band.color()));
        }
    }
    renderer.axes().render()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress() -> WeeklyProgress {
        WeeklyProgress {
            new_scope: 125.0,
            remaining: 100.0,
            done_by_week: [50.0, 35.0, 25.0, 25.0, 25.0],
            complete: 0.0,
        }
    }

    #[test]
    fn bands_follow_drawing_order() {
        let bands = bands(&progress());

        assert_eq!(bands.len(), 8);
        assert_eq!(bands[0], (ProgressBand::NewThisWeek, 125.0));
        assert_eq!(bands[1], (ProgressBand::RemainLastWeek, 100.0));
        assert_eq!(bands[2], (ProgressBand::DoneWeeksAgo(0), 50.0));
        assert_eq!(bands[6], (ProgressBand::DoneWeeksAgo(4), 25.0));
        assert_eq!(bands[7], (ProgressBand::Complete, 0.0));
    }

    #[test]
    fn labels_match_weeks() {
        assert_eq!(ProgressBand::DoneWeeksAgo(0).label(), "Done This Week");
        assert_eq!(ProgressBand::DoneWeeksAgo(1).label(), "1 Week Ago");
        assert_eq!(ProgressBand::DoneWeeksAgo(3).label(), "3 Weeks Ago");
    }

    #[test]
    fn renders_one_bar_group_per_project() {
        let all_progress = BTreeMap::from([
            ("Checkout".to_string(), progress()),
            ("Search".to_string(), progress()),
        ]);

        let svg = render_projects(&all_progress);

        assert!(svg.contains("Checkout"));
        assert!(svg.contains("Search"));
        assert!(svg.contains("#ff7043"));
        assert!(svg.contains("New This Week"));
    }
}
