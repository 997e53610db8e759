use crate::metrics::{Burnup, DailyRates, Projection, ONE_WEEK, RATE_WINDOWS};
use crate::renderer::{GraphStyle, Point, Renderer};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

const WIDTH: i32 = 640;
const HEIGHT: i32 = 360;
const MARGIN: i32 = 70;
const BAR_WIDTH: f64 = 0.7;

const CREATED: GraphStyle = GraphStyle::solid("red");
const CLOSED: GraphStyle = GraphStyle::solid("blue");
const OUTLINE: GraphStyle = GraphStyle::solid("black");
const DEVELOPERS: GraphStyle = GraphStyle::solid("green");
const RATE_STYLES: [GraphStyle; 3] = [
    GraphStyle::solid("purple"),
    GraphStyle::dashed("purple", "6 3", 1.0),
    GraphStyle::dashed("purple", "1 2", 1.0),
];

/// Maps calendar days onto the horizontal plot axis.
struct TimeAxis {
    first: NaiveDate,
    last: NaiveDate,
    width: f64,
}

impl TimeAxis {
    fn new(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            first,
            last,
            width: WIDTH as f64,
        }
    }

    fn span(&self) -> i64 {
        (self.last - self.first).num_days()
    }

    fn x(&self, day: NaiveDate) -> f64 {
        if self.span() == 0 {
            0.0
        } else {
            (day - self.first).num_days() as f64 / self.span() as f64 * self.width
        }
    }

    fn day_width(&self) -> f64 {
        self.width / self.span().max(1) as f64
    }

    /// Weekly ticks from the first day, labelled like "Jan\n8".
    fn labels(&self, mut renderer: Renderer) -> Renderer {
        let mut day = self.first;
        while day <= self.last {
            renderer = renderer.x_label(self.x(day), &day.format("%b\n%-d").to_string());
            day += Duration::days(ONE_WEEK);
        }
        renderer
    }
}

/// Maps values onto the vertical plot axis, zero at the bottom.
struct ValueAxis {
    max: f64,
    height: f64,
}

impl ValueAxis {
    fn new(max: f64) -> Self {
        Self {
            max,
            height: HEIGHT as f64,
        }
    }

    fn y(&self, value: f64) -> f64 {
        if self.max <= 0.0 {
            self.height
        } else {
            self.height - (value / self.max).min(1.0) * self.height
        }
    }
}

fn points<T: Copy + Into<f64>>(series: &[(NaiveDate, T)], time: &TimeAxis, values: &ValueAxis) -> Vec<Point> {
    series
        .iter()
        .map(|(day, value)| Point {
            x: time.x(*day),
            y: values.y((*value).into()),
        })
        .collect()
}

fn to_f64(series: &[(NaiveDate, u64)]) -> Vec<(NaiveDate, f64)> {
    series.iter().map(|(day, value)| (*day, *value as f64)).collect()
}

/// Appends the projection to a burn-up title when there is one worth showing.
pub fn burnup_title(title: &str, projection: &Projection) -> String {
    match projection {
        Projection::DaysLeft { days_left, sample_days } if *days_left > 0 && *sample_days > 0 => format!(
            "{}\nApproximate Days Left: {} ({}-day sample)",
            title, days_left, sample_days
        ),
        _ => title.to_string(),
    }
}

/// Cumulative created work against cumulative closed work.
pub fn render_burnup(burnup: &Burnup, title: &str, y_label: &str) -> String {
    let renderer = Renderer::new(WIDTH, HEIGHT, MARGIN)
        .title(&burnup_title(title, &burnup.projection))
        .y_label(y_label, false);

    let (Some((first, _)), Some((last, total))) = (burnup.created.first(), burnup.created.last()) else {
        return renderer.axes().render();
    };
    let time = TimeAxis::new(*first, *last);
    let values = ValueAxis::new((1.1 * *total as f64).max(1.0));

    let created = to_f64(&burnup.created);
    let closed = to_f64(&burnup.closed);
    let renderer = renderer
        .filled_area(&points(&created, &time, &values), &CREATED, 1.0)
        .filled_area(&points(&closed, &time, &values), &CLOSED, 1.0)
        .line(&points(&created, &time, &values), &OUTLINE)
        .line(&points(&closed, &time, &values), &OUTLINE)
        .axes()
        .legend(&format!("{} Created", y_label), &CREATED)
        .legend(&format!("{} Closed", y_label), &CLOSED);
    time.labels(renderer).render()
}

fn shade_weekends(mut renderer: Renderer, time: &TimeAxis, today: NaiveDate) -> Renderer {
    for day in time.first.iter_days().take_while(|day| *day <= time.last) {
        if day.weekday() == Weekday::Sat && day != today {
            renderer = renderer.band(time.x(day), time.x(day + Duration::days(1)), "gray", 0.2);
        }
    }
    renderer
}

/// Cumulative points closed, developers per day and rolling points per dev-day.
pub fn render_daily_rates(project_name: &str, rates: &DailyRates, today: NaiveDate) -> String {
    let renderer = Renderer::new(WIDTH, HEIGHT, MARGIN)
        .title(&format!("{} Points/Dev-Day", project_name))
        .y_label("Cumulative Points Closed", false)
        .y_label("Points / Dev-Day", true);

    let (Some((first, _)), Some((last, total))) = (rates.cumulative_closed.first(), rates.cumulative_closed.last()) else {
        return renderer.axes().render();
    };
    let time = TimeAxis::new(*first, *last);
    let mut renderer = shade_weekends(renderer, &time, today);

    let cumulative = to_f64(&rates.cumulative_closed);
    let closed_axis = ValueAxis::new((1.1 * *total as f64).max(1.0));
    renderer = renderer
        .render_line_graphs(vec![(points(&cumulative, &time, &closed_axis), CLOSED)], 0.3)
        .legend("Points Closed", &CLOSED);

    // Developers stay in the bottom fifth of the chart.
    let max_devs = rates.devs.iter().map(|(_, devs)| *devs).max().unwrap_or(0);
    let devs_axis = ValueAxis::new(5.0 * max_devs as f64);
    let bar_width = BAR_WIDTH * time.day_width();
    for (day, devs) in &rates.devs {
        for level in 1..=*devs {
            renderer = renderer.bar(
                time.x(*day),
                bar_width,
                devs_axis.y(level as f64),
                devs_axis.y((level - 1) as f64),
                DEVELOPERS.fill_color,
            );
        }
    }
    if !rates.devs.is_empty() {
        renderer = renderer.legend("Developers", &DEVELOPERS);
    }

    let max_rate = rates
        .rates
        .values()
        .flatten()
        .map(|(_, rate)| *rate)
        .fold(0.0, f64::max);
    let rate_axis = ValueAxis::new((1.5 * max_rate).round().clamp(1.0, 6.0));
    for (window, style) in RATE_WINDOWS.iter().zip(RATE_STYLES.iter()) {
        let Some(series) = rates.rates.get(window) else {
            continue;
        };
        renderer = renderer.line(&points(series, &time, &rate_axis), style).legend(
            &format!(
                "{} week: {:.1} p/dd",
                *window as i64 / ONE_WEEK,
                rates.final_rate(*window)
            ),
            style,
        );
    }

    time.labels(renderer.axes()).render()
}
