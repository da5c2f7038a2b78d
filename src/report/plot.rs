//! Box plot rendering as standalone SVG.

use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::stats::quartiles;

const WIDTH: f64 = 216.0;
const HEIGHT: f64 = 288.0;
const PLOT_TOP: f64 = 36.0;
const PLOT_BOTTOM: f64 = 260.0;
const BOX_WIDTH: f64 = 40.0;
const CENTER_X: f64 = 128.0;

/// Layout of one box: quartiles, whisker ends and points outside them.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub low_whisker: f64,
    pub high_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Whiskers reach the most extreme values within 1.5 IQR of the box.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let q = quartiles(values).ok()?;
        let iqr = q.q3 - q.q1;
        let (low_fence, high_fence) = (q.q1 - 1.5 * iqr, q.q3 + 1.5 * iqr);

        let inside = values.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
        let low_whisker = inside.clone().fold(f64::INFINITY, f64::min).min(q.q1);
        let high_whisker = inside.fold(f64::NEG_INFINITY, f64::max).max(q.q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            q1: q.q1,
            median: q.q2,
            q3: q.q3,
            low_whisker,
            high_whisker,
            outliers,
        })
    }
}

/// File name for a sector's plot of one metric.
pub fn plot_file_name(sector: &str, metric: &str) -> String {
    let sector: String = sector
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}_{}.svg", sector, metric)
}

/// Render `values` as a box plot titled `title` with y-axis label `label`.
pub fn render_box_plot(title: &str, label: &str, values: &[f64]) -> Result<String, fmt::Error> {
    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = WIDTH,
        h = HEIGHT
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        svg,
        r#"<text x="{}" y="20" text-anchor="middle" font-size="14" font-family="sans-serif">{}</text>"#,
        WIDTH / 2.0,
        escape(title)
    )?;
    writeln!(
        svg,
        r#"<text x="14" y="{y}" transform="rotate(-90 14 {y})" text-anchor="middle" font-size="11" font-family="sans-serif">{}</text>"#,
        escape(label),
        y = (PLOT_TOP + PLOT_BOTTOM) / 2.0
    )?;

    let Some(stats) = BoxStats::from_values(values) else {
        svg.push_str("</svg>\n");
        return Ok(svg);
    };

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) };
    let y = |v: f64| PLOT_BOTTOM - (v - lo) / (hi - lo) * (PLOT_BOTTOM - PLOT_TOP);

    // Axis with min and max ticks.
    let axis_x = 44.0;
    writeln!(
        svg,
        r#"<line x1="{x}" y1="{}" x2="{x}" y2="{}" stroke="black"/>"#,
        PLOT_TOP,
        PLOT_BOTTOM,
        x = axis_x
    )?;
    for v in [lo, hi] {
        writeln!(
            svg,
            r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="9" font-family="sans-serif">{}</text>"#,
            axis_x - 4.0,
            y(v) + 3.0,
            v
        )?;
    }

    let left = CENTER_X - BOX_WIDTH / 2.0;
    let right = CENTER_X + BOX_WIDTH / 2.0;
    writeln!(
        svg,
        r#"<line x1="{c}" y1="{:.1}" x2="{c}" y2="{:.1}" stroke="black"/>"#,
        y(stats.high_whisker),
        y(stats.q3),
        c = CENTER_X
    )?;
    writeln!(
        svg,
        r#"<line x1="{c}" y1="{:.1}" x2="{c}" y2="{:.1}" stroke="black"/>"#,
        y(stats.q1),
        y(stats.low_whisker),
        c = CENTER_X
    )?;
    for v in [stats.low_whisker, stats.high_whisker] {
        writeln!(
            svg,
            r#"<line x1="{}" y1="{y:.1}" x2="{}" y2="{y:.1}" stroke="black"/>"#,
            CENTER_X - BOX_WIDTH / 4.0,
            CENTER_X + BOX_WIDTH / 4.0,
            y = y(v)
        )?;
    }
    writeln!(
        svg,
        r#"<rect x="{}" y="{:.1}" width="{}" height="{:.1}" fill="none" stroke="black"/>"#,
        left,
        y(stats.q3),
        BOX_WIDTH,
        y(stats.q1) - y(stats.q3)
    )?;
    writeln!(
        svg,
        r#"<line x1="{}" y1="{y:.1}" x2="{}" y2="{y:.1}" stroke="black" stroke-width="2"/>"#,
        left,
        right,
        y = y(stats.median)
    )?;
    for v in &stats.outliers {
        writeln!(
            svg,
            r#"<circle cx="{}" cy="{:.1}" r="2.5" fill="none" stroke="black"/>"#,
            CENTER_X,
            y(*v)
        )?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Render and save a box plot as `<dir>/<sector>_<metric>.svg`.
pub fn write_box_plot(dir: &Path, sector: &str, metric: &str, values: &[f64]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(plot_file_name(sector, metric));
    let svg = render_box_plot(sector, metric, values).map_err(io::Error::other)?;
    fs::write(&path, svg)?;
    Ok(path)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
