use nalgebra::Matrix2;
use ndarray::{Array2, ArrayBase, Data, Ix2};

use crate::error::{ComputeError, ComputeResult};

/// Build an `Array2` from JSON-style nested rows.
///
/// An empty row list yields a `(0, 0)` array. Rows of unequal length are
/// rejected with `ComputeError::RaggedRows`.
pub fn array2_from_rows(rows: &[Vec<f64>]) -> ComputeResult<Array2<f64>> {
    let ncols = rows.first().map_or(0, Vec::len);
    collect_rows(rows, ncols)
}

/// Like [`array2_from_rows`], but an empty point list is the `(0, 2)` array
/// so that transforming nothing still yields a well-formed point set.
pub fn points_from_rows(rows: &[Vec<f64>]) -> ComputeResult<Array2<f64>> {
    let ncols = rows.first().map_or(2, Vec::len);
    collect_rows(rows, ncols)
}

fn collect_rows(rows: &[Vec<f64>], ncols: usize) -> ComputeResult<Array2<f64>> {
    let mut data = Vec::with_capacity(rows.len() * ncols);
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != ncols {
            return Err(ComputeError::RaggedRows {
                row: idx,
                expected: ncols,
                found: row.len(),
            });
        }
        data.extend_from_slice(row);
    }
    Array2::from_shape_vec((rows.len(), ncols), data)
        .map_err(|e| ComputeError::value(format!("Failed to build matrix: {}", e)))
}

/// Convert an array back into nested rows for JSON output.
pub fn rows_from_array2<S>(array: &ArrayBase<S, Ix2>) -> Vec<Vec<f64>>
where
    S: Data<Elem = f64>,
{
    array.outer_iter().map(|row| row.to_vec()).collect()
}

pub fn require_square2<S>(matrix: &ArrayBase<S, Ix2>) -> ComputeResult<()>
where
    S: Data<Elem = f64>,
{
    let (rows, cols) = matrix.dim();
    if (rows, cols) != (2, 2) {
        return Err(ComputeError::Shape {
            subject: "Matrix",
            expected: "2x2",
            rows,
            cols,
        });
    }
    Ok(())
}

/// Check that `points` is an `(n, 2)` array. `subject` names the argument
/// in the error message.
pub fn require_points<S>(points: &ArrayBase<S, Ix2>, subject: &'static str) -> ComputeResult<()>
where
    S: Data<Elem = f64>,
{
    let (rows, cols) = points.dim();
    if cols != 2 {
        return Err(ComputeError::Shape {
            subject,
            expected: "2D (n, 2)",
            rows,
            cols,
        });
    }
    Ok(())
}

pub fn require_finite<'a, I>(values: I) -> ComputeResult<()>
where
    I: IntoIterator<Item = &'a f64>,
{
    if values.into_iter().any(|v| !v.is_finite()) {
        return Err(ComputeError::value("Matrix entries must be finite"));
    }
    Ok(())
}

/// Validate a 2x2 array and copy it into a `nalgebra::Matrix2`.
pub fn to_matrix2<S>(matrix: &ArrayBase<S, Ix2>) -> ComputeResult<Matrix2<f64>>
where
    S: Data<Elem = f64>,
{
    require_square2(matrix)?;
    require_finite(matrix.iter())?;
    Ok(Matrix2::new(
        matrix[[0, 0]],
        matrix[[0, 1]],
        matrix[[1, 0]],
        matrix[[1, 1]],
    ))
}
