use serde::{Deserialize, Serialize};

use crate::error::{DataLoadError, LoadResult};
use crate::utils::constants::{BIN_EDGE_ADJUSTMENT, LABEL_PRECISION};

/// Equal-width, right-closed binning of one numeric column.
///
/// Edges are fitted once on the full prepared table and then reused for any
/// subset, so category labels never shift when the table is filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    column: String,
    edges: Vec<f64>,
    labels: Vec<String>,
}

impl BinSpec {
    /// Fit `bins` equal-width intervals spanning the observed min..max of `values`.
    ///
    /// The lowest edge is pushed down by 0.1% of the range so the minimum is
    /// included in the first right-closed interval. A constant column is widened
    /// by 0.1% on both sides instead.
    pub fn fit(column: &str, values: &[f64], bins: usize) -> LoadResult<Self> {
        if bins == 0 {
            return Err(DataLoadError::InvalidFormat(format!(
                "Bin count for {} must be at least 1",
                column
            )));
        }

        if values.is_empty() {
            return Err(DataLoadError::InvalidFormat(format!(
                "Cannot bin empty column {}",
                column
            )));
        }

        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(DataLoadError::InvalidFormat(format!(
                "Cannot bin non-finite value {} in column {}",
                bad, column
            )));
        }

        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        let edges = if lo == hi {
            lo -= if lo != 0.0 {
                BIN_EDGE_ADJUSTMENT * lo.abs()
            } else {
                BIN_EDGE_ADJUSTMENT
            };
            hi += if hi != 0.0 {
                BIN_EDGE_ADJUSTMENT * hi.abs()
            } else {
                BIN_EDGE_ADJUSTMENT
            };
            linspace(lo, hi, bins + 1)
        } else {
            let mut edges = linspace(lo, hi, bins + 1);
            edges[0] -= (hi - lo) * BIN_EDGE_ADJUSTMENT;
            edges
        };

        Ok(Self::from_edges(column, edges))
    }

    /// Build from explicit, strictly increasing edges.
    pub fn from_edges(column: &str, edges: Vec<f64>) -> Self {
        let labels = interval_labels(&edges);
        Self {
            column: column.to_string(),
            edges,
            labels,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn bin_count(&self) -> usize {
        self.labels.len()
    }

    pub fn lower_bound(&self) -> f64 {
        self.edges[0]
    }

    pub fn upper_bound(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Index of the interval containing `value`, or `None` outside `(first, last]`.
    pub fn assign(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }

        // Right-closed: a value equal to an edge falls in the interval below it.
        let position = self.edges.partition_point(|&edge| edge < value);
        if position == 0 || position >= self.edges.len() {
            return None;
        }

        Some(position - 1)
    }

    pub fn label(&self, bin: usize) -> Option<&str> {
        self.labels.get(bin).map(String::as_str)
    }

    /// Like [`assign`](Self::assign) but reports values outside the fitted range.
    pub fn categorize(&self, value: f64) -> LoadResult<(usize, &str)> {
        self.assign(value)
            .map(|bin| (bin, self.labels[bin].as_str()))
            .ok_or_else(|| DataLoadError::OutOfBinRange {
                column: self.column.clone(),
                value,
                min: self.lower_bound(),
                max: self.upper_bound(),
            })
    }
}

/// `num` evenly spaced points from `start` to `stop`, both ends included.
fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    if num == 1 {
        return vec![start];
    }

    let step = (stop - start) / (num - 1) as f64;
    let mut points: Vec<f64> = (0..num).map(|i| i as f64 * step + start).collect();
    points[num - 1] = stop;
    points
}

/// Render each consecutive pair of edges as `"(left, right]"`.
fn interval_labels(edges: &[f64]) -> Vec<String> {
    let precision = infer_precision(LABEL_PRECISION, edges);
    let rounded: Vec<f64> = edges.iter().map(|&e| round_frac(e, precision)).collect();

    rounded
        .windows(2)
        .map(|pair| format!("({}, {}]", format_edge(pair[0]), format_edge(pair[1])))
        .collect()
}

/// Smallest precision at or above `base` that keeps every rounded edge distinct.
fn infer_precision(base: u32, edges: &[f64]) -> u32 {
    for precision in base..20 {
        let mut levels: Vec<f64> = edges.iter().map(|&e| round_frac(e, precision)).collect();
        levels.sort_by(f64::total_cmp);
        levels.dedup();
        if levels.len() == edges.len() {
            return precision;
        }
    }
    base
}

/// Round to `precision` decimals, or to `precision` significant decimals when
/// the integer part is zero.
fn round_frac(x: f64, precision: u32) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }

    let digits = if x.trunc() == 0.0 {
        -(x.fract().abs().log10().floor() as i32) - 1 + precision as i32
    } else {
        precision as i32
    };

    round_half_even(x, digits)
}

fn round_half_even(x: f64, digits: i32) -> f64 {
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        (x * factor).round_ties_even() / factor
    } else {
        let factor = 10f64.powi(-digits);
        (x / factor).round_ties_even() * factor
    }
}

/// Shortest round-trip form, keeping a trailing `.0` on integral values.
///
/// Outside `1e-4 <= |x| < 1e16` the exponent is signed and at least two
/// digits wide, e.g. `-5e-05` and `1e+16`.
fn format_edge(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || !value.is_finite() || (1e-4..1e16).contains(&magnitude) {
        return format!("{:?}", value);
    }

    let scientific = format!("{:e}", value);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => scientific,
    }
}
