//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed PE: `o`
//! - in-sample fitted values: `-` line
//! - forecast quarters: `*`

use crate::domain::{Dataset, ForecastResult};

/// Render history, optional in-sample fit, and forecast on one time axis.
pub fn render_forecast_plot(
    dataset: &Dataset,
    fitted: Option<&[f64]>,
    forecast: &ForecastResult,
    width: usize,
    height: usize,
) -> String {
    let observed: Vec<(f64, f64)> = dataset.observations().iter().map(|o| (o.time, o.pe)).collect();
    let fitted_curve: Vec<(f64, f64)> = fitted
        .map(|f| dataset.times().into_iter().zip(f.iter().copied()).collect())
        .unwrap_or_default();
    let future: Vec<(f64, f64)> = forecast.predictions.iter().map(|p| (p.time, p.predicted_pe)).collect();

    let all = || observed.iter().chain(&fitted_curve).chain(&future);
    let time_span = span(all().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (lo, hi) = span(all().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let margin = ((hi - lo) * 0.05).max(1e-12);
    let pe_span = (lo - margin, hi + margin);

    let mut canvas = Canvas::new(width.max(10), height.max(5), time_span, pe_span);
    // Fitted line first; markers overwrite it.
    canvas.stroke(&fitted_curve, '-');
    for &(t, y) in &observed {
        canvas.put(t, y, 'o');
    }
    for &(t, y) in &future {
        canvas.put(t, y, '*');
    }

    let header = format!(
        "Plot: time=[{:.2}, {:.2}] | pe=[{:.2}, {:.2}]",
        time_span.0, time_span.1, pe_span.0, pe_span.1
    );
    canvas.render(&header)
}

/// `(min, max)` of finite input; a degenerate span is widened to unit length.
fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    match (min.is_finite() && max.is_finite(), max > min) {
        (false, _) => None,
        (true, true) => Some((min, max)),
        (true, false) => Some((min - 0.5, max + 0.5)),
    }
}

/// Character grid addressed in data coordinates (time, PE).
struct Canvas {
    cells: Vec<Vec<char>>,
    time_span: (f64, f64),
    pe_span: (f64, f64),
}

impl Canvas {
    fn new(cols: usize, rows: usize, time_span: (f64, f64), pe_span: (f64, f64)) -> Self {
        Self {
            cells: vec![vec![' '; cols]; rows],
            time_span,
            pe_span,
        }
    }

    fn cols(&self) -> usize {
        self.cells[0].len()
    }

    fn rows(&self) -> usize {
        self.cells.len()
    }

    /// `(col, row)` for a data point; row 0 holds the largest PE.
    fn cell(&self, t: f64, y: f64) -> (usize, usize) {
        let col = bucket(t, self.time_span, self.cols());
        let row = self.rows() - 1 - bucket(y, self.pe_span, self.rows());
        (col, row)
    }

    fn put(&mut self, t: f64, y: f64, ch: char) {
        let (col, row) = self.cell(t, y);
        self.cells[row][col] = ch;
    }

    /// Connect consecutive points with `ch`, leaving occupied cells alone.
    fn stroke(&mut self, points: &[(f64, f64)], ch: char) {
        for pair in points.windows(2) {
            let from = self.cell(pair[0].0, pair[0].1);
            let to = self.cell(pair[1].0, pair[1].1);
            self.segment(from, to, ch);
        }
    }

    /// DDA walk: one cell per step along the longer axis.
    fn segment(&mut self, from: (usize, usize), to: (usize, usize), ch: char) {
        let dc = to.0 as f64 - from.0 as f64;
        let dr = to.1 as f64 - from.1 as f64;
        let steps = dc.abs().max(dr.abs()) as usize;

        for i in 0..=steps {
            let f = if steps == 0 { 0.0 } else { i as f64 / steps as f64 };
            let col = (from.0 as f64 + f * dc).round() as usize;
            let row = (from.1 as f64 + f * dr).round() as usize;
            let cell = &mut self.cells[row][col];
            if *cell == ' ' {
                *cell = ch;
            }
        }
    }

    fn render(self, header: &str) -> String {
        let mut out = String::with_capacity((self.cols() + 1) * (self.rows() + 1) + header.len());
        out.push_str(header);
        out.push('\n');
        for row in self.cells {
            let line: String = row.into_iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

/// Index of `v` among `n` evenly spaced buckets covering `range`.
fn bucket(v: f64, range: (f64, f64), n: usize) -> usize {
    let u = ((v - range.0) / (range.1 - range.0)).clamp(0.0, 1.0);
    (u * (n.max(2) - 1) as f64).round() as usize
}
