//! Chart payloads built from aggregation results. Shared by the terminal
//! widgets and file export so both draw the same numbers.

use crate::aggregate::{BoxStats, CategoryCount, PairMean};
use color_eyre::Result;
use polars::prelude::*;
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Upper bound for automatic histogram binning.
pub const MAX_HISTOGRAM_BINS: usize = 50;

pub const BOX_PLOT_TITLE: &str = "Price Variation Across Selected States";
pub const GROUPED_BAR_TITLE: &str = "Average Price by Manufacturer in Selected States";

/// Format axis tick label: scientific for very large or very small magnitudes.
pub fn format_axis_label(v: f64) -> String {
    if v.abs() >= 1e6 || (v.abs() < 1e-2 && v != 0.0) {
        format!("{:.2e}", v)
    } else if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Integer with thousands separators, e.g. 1234567 -> "1,234,567".
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub center: f64,
    pub count: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramData {
    pub column: String,
    pub bins: Vec<HistogramBin>,
    pub x_min: f64,
    pub x_max: f64,
    pub max_count: f64,
    /// Non-null finite values that were binned.
    pub total: usize,
}

/// Histogram of the raw values in `column`. The bin count follows Sturges' rule.
pub fn histogram_data(df: &DataFrame, column: &str) -> Result<HistogramData> {
    let values = df
        .clone()
        .lazy()
        .select([col(column).cast(DataType::Float64)])
        .drop_nulls(None)
        .collect()?;
    let values: Vec<f64> = values
        .column(column)?
        .f64()?
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();
    Ok(histogram_from_values(column, &values))
}

fn sturges_bins(n: usize) -> usize {
    if n == 0 {
        return 1;
    }
    let k = (n as f64).log2().ceil() as usize + 1;
    k.clamp(1, MAX_HISTOGRAM_BINS)
}

fn histogram_from_values(column: &str, values: &[f64]) -> HistogramData {
    if values.is_empty() {
        return HistogramData {
            column: column.to_string(),
            bins: Vec::new(),
            x_min: 0.0,
            x_max: 1.0,
            max_count: 0.0,
            total: 0,
        };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (x_min, x_max, n_bins) = if max > min {
        (min, max, sturges_bins(values.len()))
    } else {
        (min - 0.5, max + 0.5, 1)
    };
    let width = (x_max - x_min) / n_bins as f64;

    let mut counts = vec![0usize; n_bins];
    for v in values {
        // The last bin is closed on the right so the maximum lands inside it.
        let idx = (((v - x_min) / width).floor() as usize).min(n_bins - 1);
        counts[idx] += 1;
    }

    let bins: Vec<HistogramBin> = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let start = x_min + width * i as f64;
            let end = start + width;
            HistogramBin {
                start,
                end,
                center: (start + end) / 2.0,
                count: count as f64,
            }
        })
        .collect();
    let max_count = bins.iter().map(|b| b.count).fold(0.0, f64::max);

    HistogramData {
        column: column.to_string(),
        bins,
        x_min,
        x_max,
        max_count,
        total: values.len(),
    }
}

/// One pie wedge, measured clockwise from 12 o'clock as a fraction of the full turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: u64,
    pub fraction: f64,
    pub start: f64,
    pub end: f64,
}

impl PieSlice {
    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Point on a circle of `radius` at `turn` (0..1 clockwise from 12 o'clock), y axis up.
pub fn point_on_circle(turn: f64, radius: f64) -> (f64, f64) {
    let angle = FRAC_PI_2 - turn * TAU;
    (radius * angle.cos(), radius * angle.sin())
}

/// Top-N category counts for one column, drawn as bars or a pie.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryChart {
    pub column: String,
    pub top_n: usize,
    pub title: String,
    pub counts: Vec<CategoryCount>,
}

impl CategoryChart {
    pub fn new(column: &str, top_n: usize, counts: Vec<CategoryCount>) -> Self {
        Self {
            column: column.to_string(),
            top_n,
            title: format!("Top {} Categories for {}", top_n, column),
            counts,
        }
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().map(|c| c.count).max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.count).sum()
    }

    /// Pie wedges in count order. Empty when there is nothing to count.
    pub fn slices(&self) -> Vec<PieSlice> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }
        let mut start = 0.0;
        self.counts
            .iter()
            .map(|c| {
                let fraction = c.count as f64 / total as f64;
                let slice = PieSlice {
                    label: c.value.clone(),
                    count: c.count,
                    fraction,
                    start,
                    end: start + fraction,
                };
                start += fraction;
                slice
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoxPlotData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub stats: Vec<BoxStats>,
    pub y_min: f64,
    pub y_max: f64,
}

impl BoxPlotData {
    pub fn new(stats: Vec<BoxStats>) -> Self {
        let y_min = stats.iter().map(|s| s.min).fold(f64::INFINITY, f64::min);
        let y_max = stats.iter().map(|s| s.max).fold(f64::NEG_INFINITY, f64::max);
        let (y_min, y_max) = match (y_min.is_finite(), y_max.is_finite()) {
            (true, true) if y_max > y_min => (y_min, y_max),
            (true, true) => (y_min - 1.0, y_max + 1.0),
            _ => (0.0, 1.0),
        };
        Self {
            title: BOX_PLOT_TITLE.to_string(),
            x_label: "State".to_string(),
            y_label: "Price ($)".to_string(),
            stats,
            y_min,
            y_max,
        }
    }
}

/// Mean price per (state, manufacturer), clustered by state and colored by manufacturer.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedBarData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    /// Clusters in display order.
    pub groups: Vec<String>,
    /// Distinct manufacturers, sorted; the index is the color slot.
    pub series: Vec<String>,
    pub values: Vec<PairMean>,
}

impl GroupedBarData {
    /// `group_order` fixes the cluster order; clusters without any pair are dropped.
    pub fn new(values: Vec<PairMean>, group_order: &[String]) -> Self {
        let groups: Vec<String> = group_order
            .iter()
            .filter(|g| values.iter().any(|v| &v.outer == *g))
            .cloned()
            .collect();
        let mut series: Vec<String> = values.iter().map(|v| v.inner.clone()).collect();
        series.sort();
        series.dedup();
        Self {
            title: GROUPED_BAR_TITLE.to_string(),
            x_label: "State".to_string(),
            y_label: "Average Price ($)".to_string(),
            legend_title: "Manufacturer".to_string(),
            groups,
            series,
            values,
        }
    }

    pub fn series_index(&self, name: &str) -> Option<usize> {
        self.series.binary_search_by(|s| s.as_str().cmp(name)).ok()
    }

    /// Bars of one cluster in series order.
    pub fn bars_for<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a PairMean> + 'a {
        self.values.iter().filter(move |v| v.outer == group)
    }

    pub fn max_mean(&self) -> f64 {
        self.values.iter().map(|v| v.mean).fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
