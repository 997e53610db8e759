use svg::node::element::{path::Data, Line, Path, Rectangle, Text};

pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy)]
pub struct GraphStyle {
    pub stroke_color: &'static str,
    pub fill_color: &'static str,
    pub stroke_width: f64,
    pub dash_array: Option<&'static str>,
}

impl GraphStyle {
    pub const fn solid(color: &'static str) -> Self {
        Self {
            stroke_color: color,
            fill_color: color,
            stroke_width: 2.0,
            dash_array: None,
        }
    }

    pub const fn dashed(color: &'static str, dash_array: &'static str, stroke_width: f64) -> Self {
        Self {
            stroke_color: color,
            fill_color: color,
            stroke_width,
            dash_array: Some(dash_array),
        }
    }
}

/// Builds an SVG chart. Plot coordinates run from (0, 0) at the top left to
/// (`width`, `height`); titles, labels and the legend live in the margin.
pub struct Renderer {
    document: svg::Document,
    pub width: i32,
    pub height: i32,
    margin: i32,
    legend_entries: usize,
}

impl Renderer {
    pub fn new(width: i32, height: i32, margin: i32) -> Self {
        let document = svg::Document::new()
            .set(
                "viewBox",
                (-margin, -margin, width + 2 * margin, height + 2 * margin),
            )
            .set("width", width + 2 * margin)
            .set("height", height + 2 * margin)
            .set("font-family", "sans-serif")
            .set("font-size", 11);
        Self {
            document,
            width,
            height,
            margin,
            legend_entries: 0,
        }
    }

    pub fn render_line_graphs(mut self, graphs: Vec<(Vec<Point>, GraphStyle)>, fill_opacity: f64) -> Self {
        for (points, style) in graphs {
            if !points.is_empty() {
                self = self.filled_area(&points, &style, fill_opacity);
                self = self.line(&points, &style);
            }
        }
        self
    }

    pub fn line(mut self, points: &[Point], style: &GraphStyle) -> Self {
        let mut path_data = Data::new();
        if let Some(first) = points.first() {
            path_data = path_data.move_to((first.x, first.y));
            for point in points {
                path_data = path_data.line_to((point.x, point.y));
            }
        }
        let mut path = Path::new()
            .set("d", path_data)
            .set("stroke", style.stroke_color)
            .set("stroke-width", style.stroke_width)
            .set("fill", "none");
        if let Some(dash_array) = style.dash_array {
            path = path.set("stroke-dasharray", dash_array);
        }
        self.document = self.document.add(path);
        self
    }

    pub fn filled_area(mut self, points: &[Point], style: &GraphStyle, opacity: f64) -> Self {
        let mut path_data = Data::new();
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            path_data = path_data.move_to((first.x, self.height as f64));
            for point in points {
                path_data = path_data.line_to((point.x, point.y));
            }
            path_data = path_data.line_to((last.x, self.height as f64)).close();
        }
        let path = Path::new()
            .set("d", path_data)
            .set("fill", style.fill_color)
            .set("fill-opacity", opacity)
            .set("stroke", "none");
        self.document = self.document.add(path);
        self
    }

    /// A bar from `bottom` up to `top`, centred on `x`.
    pub fn bar(mut self, x: f64, bar_width: f64, top: f64, bottom: f64, color: &str) -> Self {
        let rectangle = Rectangle::new()
            .set("x", x - bar_width / 2.0)
            .set("y", top.min(bottom))
            .set("width", bar_width)
            .set("height", (bottom - top).abs())
            .set("fill", color)
            .set("stroke", "white")
            .set("stroke-width", 0.5);
        self.document = self.document.add(rectangle);
        self
    }

    /// A translucent vertical band, used to shade weekends.
    pub fn band(mut self, from_x: f64, to_x: f64, color: &str, opacity: f64) -> Self {
        let rectangle = Rectangle::new()
            .set("x", from_x)
            .set("y", 0)
            .set("width", (to_x - from_x).max(0.0))
            .set("height", self.height)
            .set("fill", color)
            .set("fill-opacity", opacity);
        self.document = self.document.add(rectangle);
        self
    }

    pub fn horizontal_line(mut self, y: f64, color: &str, stroke_width: f64, dash_array: Option<&str>) -> Self {
        let mut line = Line::new()
            .set("x1", 0)
            .set("y1", y)
            .set("x2", self.width)
            .set("y2", y)
            .set("stroke", color)
            .set("stroke-width", stroke_width);
        if let Some(dash_array) = dash_array {
            line = line.set("stroke-dasharray", dash_array);
        }
        self.document = self.document.add(line);
        self
    }

    pub fn axes(mut self) -> Self {
        let axes = Path::new()
            .set(
                "d",
                Data::new()
                    .move_to((0.0, 0.0))
                    .line_to((0.0, self.height as f64))
                    .line_to((self.width as f64, self.height as f64)),
            )
            .set("stroke", "black")
            .set("stroke-width", 1)
            .set("fill", "none");
        self.document = self.document.add(axes);
        self
    }

    /// Title lines stacked above the plot area.
    pub fn title(mut self, title: &str) -> Self {
        let lines: Vec<&str> = title.lines().collect();
        for (index, line) in lines.iter().enumerate() {
            let offset = (lines.len() - index) as f64 * 16.0;
            let text = Text::new(*line)
                .set("x", self.width as f64 / 2.0)
                .set("y", -offset + 4.0)
                .set("text-anchor", "middle")
                .set("font-size", 14);
            self.document = self.document.add(text);
        }
        self
    }

    pub fn x_label(mut self, x: f64, label: &str) -> Self {
        for (index, line) in label.lines().enumerate() {
            let text = Text::new(line)
                .set("x", x)
                .set("y", self.height as f64 + 14.0 + index as f64 * 12.0)
                .set("text-anchor", "middle");
            self.document = self.document.add(text);
        }
        self
    }

    /// A rotated axis label on the left or right edge.
    pub fn y_label(mut self, label: &str, right: bool) -> Self {
        let x = if right {
            self.width as f64 + self.margin as f64 * 0.6
        } else {
            -self.margin as f64 * 0.6
        };
        let y = self.height as f64 / 2.0;
        let text = Text::new(label)
            .set("x", x)
            .set("y", y)
            .set("text-anchor", "middle")
            .set("transform", format!("rotate(-90 {} {})", x, y));
        self.document = self.document.add(text);
        self
    }

    pub fn legend(mut self, label: &str, style: &GraphStyle) -> Self {
        let y = 12.0 + self.legend_entries as f64 * 16.0;
        let mut swatch = Line::new()
            .set("x1", 8)
            .set("y1", y - 4.0)
            .set("x2", 28)
            .set("y2", y - 4.0)
            .set("stroke", style.stroke_color)
            .set("stroke-width", style.stroke_width.max(4.0));
        if let Some(dash_array) = style.dash_array {
            swatch = swatch.set("stroke-dasharray", dash_array);
        }
        let text = Text::new(label).set("x", 34).set("y", y);
        self.document = self.document.add(swatch).add(text);
        self.legend_entries += 1;
        self
    }

    pub fn render(self) -> String {
        self.document.to_string()
    }
}
