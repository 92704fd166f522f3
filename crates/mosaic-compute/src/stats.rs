use ndarray::{s, Array1, Array2};
use ndarray_stats::interpolate::{Higher, Interpolate, Lower};
use ndarray_stats::{CorrelationExt, Quantile1dExt};
use noisy_float::types::{n64, N64};
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::data_handling::{Cell, ColumnMap, Dataset};
use crate::error::{ComputeError, ComputeResult};
use crate::math::rows_from_array2;

pub const DEFAULT_BINS: usize = 20;

/// Summary statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1); NaN for a single value.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
    /// Non-missing values.
    pub count: usize,
    pub missing: usize,
}

/// Per-column statistics in dataset column order.
pub type StatsResult = ColumnMap<ColumnStats>;

/// Compute summary statistics for every numeric column.
///
/// Missing values are dropped before computing; a column with no values
/// left is left out of the result without error. `missing` counts the gaps
/// of the original column. Quantiles (including the median) use linear
/// interpolation between order statistics.
///
/// # Arguments
///
/// * `dataset` - The uploaded table.
///
/// # Returns
///
/// A map from column name to `ColumnStats`, ordered as in the dataset.
pub fn compute_basic_stats(dataset: &Dataset) -> ComputeResult<StatsResult> {
    let mut stats = StatsResult::new();

    for column in dataset.numeric_columns() {
        let values = column.present_values().unwrap_or_default();
        if values.is_empty() {
            log::debug!("Skipping column '{}': no values present", column.name());
            continue;
        }

        let mut ordered: Array1<N64> = values.iter().map(|&v| n64(v)).collect();

        stats.insert(
            column.name(),
            ColumnStats {
                mean: values.iter().mean(),
                median: linear_quantile(&mut ordered, 0.5)?,
                std: values.iter().std_dev(),
                min: Statistics::min(values.iter()),
                max: Statistics::max(values.iter()),
                q25: linear_quantile(&mut ordered, 0.25)?,
                q75: linear_quantile(&mut ordered, 0.75)?,
                count: values.len(),
                missing: column.missing_count(),
            },
        );
    }

    Ok(stats)
}

/// Linear interpolation between the order statistics around `q`.
///
/// The neighbours come from ndarray-stats; the interpolation is done in
/// plain `f64`, where spanning two infinities yields NaN like any other
/// `inf - inf`.
fn linear_quantile(values: &mut Array1<N64>, q: f64) -> ComputeResult<f64> {
    let lower = order_statistic(values, q, &Lower)?;
    let higher = order_statistic(values, q, &Higher)?;
    let position = q * (values.len() - 1) as f64;
    let fraction = position - position.floor();
    if fraction == 0.0 {
        return Ok(lower);
    }
    Ok(lower + (higher - lower) * fraction)
}

fn order_statistic<I: Interpolate<N64>>(values: &mut Array1<N64>, q: f64, interpolate: &I) -> ComputeResult<f64> {
    values
        .quantile_mut(n64(q), interpolate)
        .map(|v| v.raw())
        .map_err(|e| ComputeError::value(format!("Quantile {} failed: {}", q, e)))
}

/// Equal-width histogram of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub counts: Vec<usize>,
    /// `bins + 1` edges from the column minimum to its maximum.
    pub bin_edges: Vec<f64>,
    pub bin_centers: Vec<f64>,
}

/// Bin the non-missing values of `column` into `bins` equal-width intervals.
///
/// The intervals span `[min, max]` of the column (widened by 0.5 on each
/// side when all values are equal). Each bin is half-open except the last,
/// which also holds the maximum, so the counts sum to the number of present
/// values.
///
/// # Arguments
///
/// * `dataset` - The uploaded table.
/// * `column` - Name of a numeric column.
/// * `bins` - Number of bins; must be positive.
///
/// # Errors
///
/// `ComputeError::Value` if the column is absent, not numeric, has no
/// values, or has an infinite range, or if `bins` is zero.
pub fn prepare_histogram_data(dataset: &Dataset, column: &str, bins: usize) -> ComputeResult<Histogram> {
    let col = dataset
        .column(column)
        .ok_or_else(|| ComputeError::value(format!("Column '{}' not found in DataFrame", column)))?;
    let values = col
        .present_values()
        .ok_or_else(|| ComputeError::value(format!("Column '{}' is not numeric", column)))?;
    if values.is_empty() {
        return Err(ComputeError::value(format!("Column '{}' has no valid data", column)));
    }
    if bins == 0 {
        return Err(ComputeError::value("`bins` must be positive, when an integer"));
    }
    let n_edges = bins
        .checked_add(1)
        .ok_or_else(|| ComputeError::value(format!("`bins` is too large: {}", bins)))?;

    let (mut lo, mut hi) = (Statistics::min(values.iter()), Statistics::max(values.iter()));
    if !(lo.is_finite() && hi.is_finite()) {
        return Err(ComputeError::value(format!(
            "autodetected range of [{}, {}] is not finite",
            lo, hi
        )));
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let edges = Array1::linspace(lo, hi, n_edges);
    let scale = bins as f64 / (hi - lo);
    let mut counts = vec![0usize; bins];
    for &v in &values {
        let mut idx = (((v - lo) * scale) as usize).min(bins - 1);
        // the float division can land one bin off near an edge
        if v < edges[idx] {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    let centers = (&edges.slice(s![..-1]) + &edges.slice(s![1..])) / 2.0;

    Ok(Histogram {
        counts,
        bin_edges: edges.to_vec(),
        bin_centers: centers.to_vec(),
    })
}

/// Paired values for a scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterData {
    pub x: Vec<Cell>,
    pub y: Vec<Cell>,
}

/// Extract `(x, y)` pairs from two columns of any type.
///
/// A row is dropped when either of its two values is missing, so `x` and
/// `y` always have the same length and stay row-aligned.
///
/// # Errors
///
/// `ComputeError::Value` if either column is absent.
pub fn prepare_scatter_data(dataset: &Dataset, x_col: &str, y_col: &str) -> ComputeResult<ScatterData> {
    let (x_column, y_column) = match (dataset.column(x_col), dataset.column(y_col)) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            return Err(ComputeError::value(
                "One or both columns not found in DataFrame",
            ))
        }
    };

    let mut scatter = ScatterData {
        x: Vec::with_capacity(dataset.nrows()),
        y: Vec::with_capacity(dataset.nrows()),
    };
    for row in 0..dataset.nrows() {
        let (x, y) = (x_column.cell(row), y_column.cell(row));
        if x.is_missing() || y.is_missing() {
            continue;
        }
        scatter.x.push(x);
        scatter.y.push(y);
    }
    Ok(scatter)
}

/// Pearson correlation matrix of the numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Symmetric, `columns.len()` square.
    pub values: Vec<Vec<f64>>,
}

/// Pairwise Pearson correlation between all numeric columns.
///
/// Each pair uses the rows where both columns have a value. Pairs with
/// fewer than two such rows, or with a constant column, yield NaN.
pub fn compute_correlation(dataset: &Dataset) -> CorrelationMatrix {
    let numeric: Vec<(String, Vec<Option<f64>>)> = dataset
        .numeric_columns()
        .filter_map(|c| c.numeric_values().map(|v| (c.name().to_string(), v)))
        .collect();

    let k = numeric.len();
    let mut values = Array2::<f64>::from_elem((k, k), f64::NAN);
    for i in 0..k {
        for j in i..k {
            let r = pairwise_pearson(&numeric[i].1, &numeric[j].1);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    CorrelationMatrix {
        columns: numeric.into_iter().map(|(name, _)| name).collect(),
        values: rows_from_array2(&values),
    }
}

fn pairwise_pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    let m = xs.len();
    if m < 2 {
        return f64::NAN;
    }

    let mut stacked = xs;
    stacked.extend(ys);
    // rows are variables, columns observations
    match Array2::from_shape_vec((2, m), stacked) {
        Ok(pair) => pair
            .pearson_correlation()
            .map(|c| c[[0, 1]])
            .unwrap_or(f64::NAN),
        Err(_) => f64::NAN,
    }
}
