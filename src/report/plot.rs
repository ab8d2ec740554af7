//! Ki(A) vs Ki(B) scatter plot using plotters (SVG output)
//!
//! Uses the SVG backend to avoid system font dependencies.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::pipeline::{
    single_column_values, AffinityPair, CurateError, CurateResult, Interaction,
};

const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const PINK_GREEN: [(u8, u8, u8); 5] = [
    (142, 1, 82),
    (222, 119, 174),
    (247, 247, 247),
    (127, 188, 65),
    (39, 100, 25),
];

/// Colour scale for a curation run.
///
/// Scores from `scores` when given; otherwise each pair's ligand count in
/// `cleaned`, the curated table as it was before training-set rows were
/// removed.
pub fn run_colour_scale(
    pairs: &[AffinityPair],
    scores: Option<&Path>,
    cleaned: &[Interaction],
) -> CurateResult<ColourScale> {
    match scores {
        Some(path) => ColourScale::from_score_file(path, pairs.len()),
        None => Ok(ColourScale::ligand_counts(
            pairs,
            cleaned.iter().map(|r| r.smiles.as_str()),
        )),
    }
}

/// Per-row colour values for the scatter
#[derive(Debug, Clone, PartialEq)]
pub enum ColourScale {
    /// Number of times each pair's ligand occurs in the curated table
    LigandCounts(Vec<f64>),
    /// Auxiliary per-row scores (e.g. docking guess quality)
    Scores(Vec<f64>),
}

impl ColourScale {
    /// Count ligand occurrences in `smiles` for every pair's ligand
    pub fn ligand_counts<'a>(
        pairs: &[AffinityPair],
        smiles: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for s in smiles {
            *counts.entry(s).or_insert(0) += 1;
        }
        let values = pairs
            .iter()
            .map(|p| counts.get(p.a.smiles.as_str()).copied().unwrap_or(0) as f64)
            .collect();
        Self::LigandCounts(values)
    }

    /// Read a single-column score file aligned to table A's row order
    pub fn from_score_file(path: &Path, expected: usize) -> CurateResult<Self> {
        let scores = read_scores(path)?;
        if scores.len() != expected {
            return Err(CurateError::Score {
                expected,
                found: scores.len(),
            });
        }
        Ok(Self::Scores(scores))
    }

    pub fn values(&self) -> &[f64] {
        match self {
            Self::LigandCounts(v) | Self::Scores(v) => v,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LigandCounts(_) => "Ligand counts",
            Self::Scores(_) => "DiffDock guess",
        }
    }

    fn stops(&self) -> &'static [(u8, u8, u8); 5] {
        match self {
            Self::LigandCounts(_) => &VIRIDIS,
            Self::Scores(_) => &PINK_GREEN,
        }
    }

    /// Colour range, widened when every value is equal
    fn range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .values()
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() {
            (0.0, 1.0)
        } else if hi - lo < f64::EPSILON {
            (lo, lo + 1.0)
        } else {
            (lo, hi)
        }
    }

    fn colour(&self, value: f64) -> RGBColor {
        let (lo, hi) = self.range();
        gradient(self.stops(), (value - lo) / (hi - lo))
    }
}

/// Read the values of a single-column numeric file
pub fn read_scores(path: &Path) -> CurateResult<Vec<f64>> {
    single_column_values(path)?
        .into_iter()
        .map(|value| {
            let text = value.unwrap_or_default();
            text.trim().parse::<f64>().map_err(|_| CurateError::Value {
                column: "0".to_string(),
                value: text,
            })
        })
        .collect()
}

fn gradient(stops: &[(u8, u8, u8); 5], t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (stops.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - i as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (stops[i], stops[i + 1]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// One plotted pair in log space
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    /// Relative errors sem / Ki, used as log-space half-widths
    pub err_x: f64,
    pub err_y: f64,
    pub value: f64,
}

impl PlotPoint {
    /// Rows whose two relative errors are both zero get no error bars
    pub fn has_error_bars(&self) -> bool {
        self.err_x != 0.0 || self.err_y != 0.0
    }
}

/// Log-transform the pairs; pairs with a non-positive Ki are skipped
pub fn plot_points(pairs: &[AffinityPair], colour: &ColourScale) -> Vec<PlotPoint> {
    let values = colour.values();
    pairs
        .iter()
        .enumerate()
        .filter_map(|(i, pair)| {
            if pair.a.ki <= 0.0 || pair.b.ki <= 0.0 {
                log::warn!("pair {} has a non-positive Ki and is left off the plot", i);
                return None;
            }
            Some(PlotPoint {
                x: pair.a.ki.ln(),
                y: pair.b.ki.ln(),
                err_x: pair.a.ki_sem / pair.a.ki,
                err_y: pair.b.ki_sem / pair.b.ki,
                value: values.get(i).copied().unwrap_or(f64::NAN),
            })
        })
        .collect()
}

/// Render the log-log Ki(A) vs Ki(B) scatter with error bars and reference lines
pub fn render_affinity_plot(
    path: &Path,
    pairs: &[AffinityPair],
    colour: &ColourScale,
    threshold: f64,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let root = SVGBackend::new(path, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let points = plot_points(pairs, colour);
    if points.is_empty() {
        root.draw(&Text::new(
            "No affinity pairs",
            (600, 450),
            ("sans-serif", 24).into_font().color(&BLACK),
        ))?;
        root.present()?;
        return Ok(());
    }

    let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        let lo = lo.min(p.x - p.err_x).min(p.y - p.err_y);
        let hi = hi.max(p.x + p.err_x).max(p.y + p.err_y);
        (lo, hi)
    });
    let offset = threshold.ln();
    let pad = ((hi - lo) * 0.05).max(0.5);
    let (lo, hi) = (lo - pad, hi + pad);

    let (plot_area, bar_area) = root.split_horizontally(1060);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption("Ki of paired proteins", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(lo..hi, (lo + offset.min(0.0))..hi)?;

    chart
        .configure_mesh()
        .x_desc("log(Ki A)")
        .y_desc("log(Ki B)")
        .label_style(("sans-serif", 18))
        .draw()?;

    let error_style = RED.stroke_width(1);
    chart.draw_series(
        points
            .iter()
            .filter(|p| p.has_error_bars())
            .map(|p| ErrorBar::new_horizontal(p.y, p.x - p.err_x, p.x, p.x + p.err_x, error_style, 8)),
    )?;
    chart.draw_series(
        points
            .iter()
            .filter(|p| p.has_error_bars())
            .map(|p| ErrorBar::new_vertical(p.x, p.y - p.err_y, p.y, p.y + p.err_y, error_style, 8)),
    )?;

    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new((p.x, p.y), 5, colour.colour(p.value).filled())),
    )?;

    let identity_style = gradient(&VIRIDIS, 0.0).stroke_width(2);
    chart
        .draw_series(LineSeries::new(vec![(lo, lo), (hi, hi)], identity_style))?
        .label("log(Ki A) = log(Ki B)")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], identity_style));

    let offset_style = gradient(&VIRIDIS, 0.33).stroke_width(2);
    chart
        .draw_series(LineSeries::new(
            vec![(lo, lo + offset), (hi, hi + offset)],
            offset_style,
        ))?
        .label(format!("log(Ki B / Ki A) = log({})", threshold))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], offset_style));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 18))
        .draw()?;

    draw_colour_bar(&bar_area, colour)?;

    root.present()?;
    log::debug!("rendered {} points to {}", points.len(), path.display());
    Ok(())
}

fn draw_colour_bar(area: &DrawingArea<SVGBackend<'_>, Shift>, colour: &ColourScale) -> Result<()> {
    let (lo, hi) = colour.range();
    let mut bar = ChartBuilder::on(area)
        .caption(colour.label(), ("sans-serif", 16))
        .margin(20)
        .x_label_area_size(10)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(0)
        .draw()?;

    let steps = 50;
    bar.draw_series((0..steps).map(|s| {
        let v0 = lo + (hi - lo) * s as f64 / steps as f64;
        let v1 = lo + (hi - lo) * (s + 1) as f64 / steps as f64;
        Rectangle::new([(0.0, v0), (1.0, v1)], colour.colour(v0).filled())
    }))?;
    Ok(())
}
