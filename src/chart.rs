use crate::models::SeriesPoint;
use crate::html::escape_html;
use chrono::NaiveDate;
use std::fmt::Write;
use std::str::FromStr;
use thiserror::Error;

const GRID_INTERVALS: usize = 5;
const DENSE_LABEL_THRESHOLD: usize = 14;
const POINT_RADIUS: f64 = 4.0;

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("y axis minimum {min} must be below maximum {max}")]
    InvalidAxis { min: f64, max: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapStyle {
    #[default]
    Connect,
    Break,
}

impl FromStr for GapStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "connect" => Ok(Self::Connect),
            "break" => Ok(Self::Break),
            other => Err(format!("gaps must be 'connect' or 'break', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub padding_left: f64,
    pub padding_right: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub y_label: Option<String>,
    pub unit: Option<String>,
    pub gaps: GapStyle,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 260.0,
            padding_left: 52.0,
            padding_right: 24.0,
            padding_top: 24.0,
            padding_bottom: 34.0,
            y_min: None,
            y_max: None,
            y_label: None,
            unit: None,
            gaps: GapStyle::Connect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    pub min: f64,
    pub max: f64,
}

impl AxisScale {
    pub fn fit(
        values: &[Option<f64>],
        y_min: Option<f64>,
        y_max: Option<f64>,
    ) -> Result<Option<Self>, ChartError> {
        let recorded: Vec<f64> = values.iter().flatten().copied().collect();
        if recorded.is_empty() {
            return Ok(None);
        }
        let min = y_min.unwrap_or_else(|| recorded.iter().copied().fold(0.0, f64::min));
        let max = y_max.unwrap_or_else(|| recorded.iter().copied().fold(1.0, f64::max));
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ChartError::InvalidAxis { min, max });
        }
        Ok(Some(Self { min, max }))
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub index: usize,
    pub date: NaiveDate,
    pub label: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gridline {
    pub y: f64,
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub index: usize,
    pub x: f64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub scale: AxisScale,
    pub line_path: String,
    pub area_path: String,
    pub gridlines: Vec<Gridline>,
    pub x_labels: Vec<AxisLabel>,
    pub points: Vec<PlotPoint>,
    pub y_label: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Chart {
    Empty { width: f64, height: f64 },
    Plot(ChartGeometry),
}

pub fn build_chart(series: &[SeriesPoint], options: &ChartOptions) -> Result<Chart, ChartError> {
    let values: Vec<Option<f64>> = series.iter().map(|point| point.value).collect();
    let Some(scale) = AxisScale::fit(&values, options.y_min, options.y_max)? else {
        return Ok(Chart::Empty {
            width: options.width,
            height: options.height,
        });
    };

    let left = options.padding_left;
    let right = options.width - options.padding_right;
    let top = options.padding_top;
    let bottom = options.height - options.padding_bottom;
    let x_step = if series.len() > 1 {
        (right - left) / (series.len() - 1) as f64
    } else {
        0.0
    };
    let x = |index: usize| left + index as f64 * x_step;
    let y = |value: f64| {
        let ratio = ((value - scale.min) / scale.span()).clamp(0.0, 1.0);
        bottom - ratio * (bottom - top)
    };

    let points: Vec<PlotPoint> = series
        .iter()
        .enumerate()
        .filter_map(|(index, point)| {
            let value = point.value?;
            Some(PlotPoint {
                index,
                date: point.date,
                label: point.label.clone(),
                value,
                x: x(index),
                y: y(value),
            })
        })
        .collect();

    let runs = split_runs(&points, options.gaps);
    let (line_path, area_path) = paths(&runs, bottom);

    let gridlines = (0..=GRID_INTERVALS)
        .map(|step| {
            let value = scale.min + scale.span() * step as f64 / GRID_INTERVALS as f64;
            Gridline {
                y: y(value),
                value,
                label: format_axis_value(value),
            }
        })
        .collect();

    let x_labels = sparse_labels(series)
        .into_iter()
        .map(|index| AxisLabel {
            index,
            x: x(index),
            text: series[index].label.clone(),
        })
        .collect();

    Ok(Chart::Plot(ChartGeometry {
        width: options.width,
        height: options.height,
        left,
        right,
        top,
        bottom,
        scale,
        line_path,
        area_path,
        gridlines,
        x_labels,
        points,
        y_label: options.y_label.clone(),
        unit: options.unit.clone(),
    }))
}

fn split_runs(points: &[PlotPoint], gaps: GapStyle) -> Vec<&[PlotPoint]> {
    if gaps == GapStyle::Connect {
        return if points.is_empty() { Vec::new() } else { vec![points] };
    }
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=points.len() {
        let broken = i == points.len() || points[i].index != points[i - 1].index + 1;
        if broken {
            runs.push(&points[start..i]);
            start = i;
        }
    }
    runs
}

fn paths(runs: &[&[PlotPoint]], baseline: f64) -> (String, String) {
    let mut line = String::new();
    let mut area = String::new();
    for run in runs.iter().filter(|run| run.len() > 1) {
        let first = &run[0];
        let last = &run[run.len() - 1];
        if !line.is_empty() {
            line.push(' ');
            area.push(' ');
        }
        let _ = write!(area, "M{:.2},{:.2}", first.x, baseline);
        for (i, point) in run.iter().enumerate() {
            let command = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                line.push(' ');
            }
            let _ = write!(line, "{command}{:.2},{:.2}", point.x, point.y);
            let _ = write!(area, " L{:.2},{:.2}", point.x, point.y);
        }
        let _ = write!(area, " L{:.2},{:.2} Z", last.x, baseline);
    }
    (line, area)
}

fn sparse_labels(series: &[SeriesPoint]) -> Vec<usize> {
    let step = if series.len() > DENSE_LABEL_THRESHOLD {
        series.len().div_ceil(10)
    } else {
        1
    };
    let mut shown: Vec<usize> = Vec::new();
    for (index, point) in series.iter().enumerate() {
        if point.label.is_empty() {
            continue;
        }
        match shown.last() {
            Some(previous) if index - previous < step => {}
            _ => shown.push(index),
        }
    }
    shown
}

pub fn format_axis_value(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

impl PlotPoint {
    pub fn describe(&self, unit: Option<&str>) -> String {
        let mut text = self.date.format("%Y-%m-%d").to_string();
        if !self.label.is_empty() {
            let _ = write!(text, " ({})", self.label);
        }
        let _ = write!(text, ": {}", self.value);
        if let Some(unit) = unit {
            let _ = write!(text, " {unit}");
        }
        text
    }
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        matches!(self, Chart::Empty { .. })
    }

    pub fn to_svg(&self) -> String {
        match self {
            Chart::Empty { width, height } => format!(
                r#"<svg class="habit-chart" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg" role="img" aria-label="No data yet"><text class="chart-label chart-empty" x="{}" y="{}" text-anchor="middle">No data yet</text></svg>"#,
                width / 2.0,
                height / 2.0
            ),
            Chart::Plot(geometry) => geometry.to_svg(),
        }
    }
}

impl ChartGeometry {
    pub fn to_svg(&self) -> String {
        let mut output = String::new();
        let aria = escape_html(self.y_label.as_deref().unwrap_or("Habit chart"));
        let _ = writeln!(
            output,
            r#"<svg class="habit-chart" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg" role="img" aria-label="{aria}">"#,
            self.width, self.height
        );

        for line in &self.gridlines {
            let _ = writeln!(
                output,
                r#"  <line class="chart-grid" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" />"#,
                self.left, line.y, self.right, line.y
            );
            let _ = writeln!(
                output,
                r#"  <text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
                self.left - 10.0,
                line.y + 4.0,
                line.label
            );
        }

        if let Some(label) = &self.y_label {
            let mid = (self.top + self.bottom) / 2.0;
            let _ = writeln!(
                output,
                r#"  <text class="chart-label chart-y-label" x="12" y="{mid:.2}" text-anchor="middle" transform="rotate(-90 12 {mid:.2})">{}</text>"#,
                escape_html(label)
            );
        }

        if !self.area_path.is_empty() {
            let _ = writeln!(output, r#"  <path class="chart-area" d="{}" />"#, self.area_path);
            let _ = writeln!(output, r#"  <path class="chart-line" d="{}" />"#, self.line_path);
        }

        let unit = self.unit.as_deref();
        for point in &self.points {
            let _ = writeln!(
                output,
                r#"  <circle class="chart-point" cx="{:.2}" cy="{:.2}" r="{POINT_RADIUS}" tabindex="0" data-date="{}" data-value="{}"><title>{}</title></circle>"#,
                point.x,
                point.y,
                point.date.format("%Y-%m-%d"),
                point.value,
                escape_html(&point.describe(unit))
            );
        }

        for label in &self.x_labels {
            let _ = writeln!(
                output,
                r#"  <text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
                label.x,
                self.bottom + 18.0,
                escape_html(&label.text)
            );
        }

        output.push_str("</svg>");
        output
    }
}
