//! Plain-text rendering sink for the shell.

use std::fmt::Write as _;

use coinbayes_present::{LineSeries, RenderSink, SeriesPoint, Table};

const BAR_WIDTH: usize = 40;
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Accumulates rendered text; the shell flushes it after each command.
#[derive(Debug, Default)]
pub struct TextSink {
    out: String,
}

impl TextSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    #[must_use]
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}

fn bar(value: f64) -> String {
    let filled = (value.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    let mut bar = "#".repeat(filled);
    bar.push_str(&" ".repeat(BAR_WIDTH - filled));
    bar
}

fn sparkline(points: &[(u32, f64)]) -> String {
    points
        .iter()
        .map(|&(_, value)| {
            let level = (value.clamp(0.0, 1.0) * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[level]
        })
        .collect()
}

impl RenderSink for TextSink {
    fn bar_chart(&mut self, title: &str, points: &[SeriesPoint]) {
        self.line(format!("{title}:"));
        let width = points.iter().map(|p| p.label.len()).max().unwrap_or(0);
        for point in points {
            self.line(format!(
                "  {:>width$} |{}| {:.4}",
                point.label,
                bar(point.value),
                point.value
            ));
        }
    }

    fn line_chart(&mut self, title: &str, series: &[LineSeries]) {
        self.line(format!("{title}:"));
        let width = series.iter().map(|s| s.label.len()).max().unwrap_or(0);
        for line in series {
            let last = line.points.last().map_or(0.0, |&(_, value)| value);
            self.line(format!(
                "  {:>width$} {} {:.4}",
                line.label,
                sparkline(&line.points),
                last
            ));
        }
    }

    fn table(&mut self, title: &str, table: &Table) {
        self.line(format!("{title}:"));
        let mut widths: Vec<usize> = table.header.iter().map(String::len).collect();
        for row in &table.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }
        let format_row = |cells: &[String]| {
            let mut text = String::from(" ");
            for (cell, width) in cells.iter().zip(&widths) {
                let _ = write!(text, " {cell:>width$}");
            }
            text
        };
        let header = format_row(&table.header);
        let rule = format!("  {}", "-".repeat(header.len().saturating_sub(2)));
        self.line(header);
        self.line(rule);
        for row in &table.rows {
            let text = format_row(row);
            self.line(text);
        }
    }
}
