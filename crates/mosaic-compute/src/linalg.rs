//! Two-dimensional linear algebra behind the vektor endpoints.
//!
//! Every routine takes dynamically shaped `ndarray` input and checks the
//! shape itself, so a caller passing a 2x3 "matrix" gets a
//! `ComputeError::Shape` rather than a panic. Decompositions are delegated to
//! `nalgebra`.
use std::cmp::Ordering;
use std::str::FromStr;

use nalgebra::{Matrix2, SymmetricEigen, Vector2};
use ndarray::{array, Array1, Array2, ArrayBase, Axis, Data, Ix2};

use crate::error::{ComputeError, ComputeResult};
use crate::math::{normalize_complex, require_finite, require_points, require_square2, to_matrix2, Complex64};

pub const DEFAULT_GRID_SIZE: usize = 10;
pub const DEFAULT_GRID_RANGE: f64 = 5.0;

/// Iteration cap for the covariance eigensolver; a 2x2 symmetric matrix
/// converges in a handful of sweeps.
const PCA_MAX_ITERATIONS: usize = 1_000;

/// Apply a 2x2 matrix to every point of an `(n, 2)` point set.
///
/// Each output row is `matrix · [x, y]ᵀ`, computed for the whole set as
/// `points · matrixᵀ`. Row order and count are preserved, including the
/// empty set.
///
/// # Errors
///
/// `ComputeError::Shape` if `matrix` is not 2x2 or `points` does not have
/// two columns.
pub fn transform_points<S1, S2>(
    points: &ArrayBase<S1, Ix2>,
    matrix: &ArrayBase<S2, Ix2>,
) -> ComputeResult<Array2<f64>>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    require_square2(matrix)?;
    require_points(points, "Points")?;
    Ok(points.dot(&matrix.t()))
}

/// Eigenvalues and unit eigenvectors of a real 2x2 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenResult {
    /// In the order produced by the Schur decomposition; not sorted.
    pub eigenvalues: Vector2<Complex64>,
    /// Column `j` is the eigenvector belonging to `eigenvalues[j]`.
    pub eigenvectors: Matrix2<Complex64>,
}

/// Eigendecomposition of a 2x2 matrix.
///
/// Real matrices may have complex conjugate eigenvalue pairs (rotations,
/// for instance), so both eigenvalues and eigenvectors are complex. Each
/// eigenvector is taken from the null space of `A - λI` and normalized to
/// unit length.
///
/// # Errors
///
/// `ComputeError::Shape` if `matrix` is not 2x2, `ComputeError::Value` if it
/// holds non-finite entries.
pub fn compute_eigen<S>(matrix: &ArrayBase<S, Ix2>) -> ComputeResult<EigenResult>
where
    S: Data<Elem = f64>,
{
    let m = to_matrix2(matrix)?;
    let eigenvalues = m.complex_eigenvalues();

    let mut eigenvectors = Matrix2::<Complex64>::zeros();
    for (idx, &lambda) in eigenvalues.iter().enumerate() {
        let v = normalize_complex(null_vector(&m, lambda, idx));
        eigenvectors.set_column(idx, &v);
    }

    log::trace!("eigenvalues {:?}", eigenvalues.as_slice());
    Ok(EigenResult {
        eigenvalues,
        eigenvectors,
    })
}

/// A non-zero solution of `(A - λI) v = 0`.
///
/// Uses the row of `A - λI` with the larger magnitude: a row `[p, q]` is
/// annihilated by `[q, -p]`. When both rows vanish, `A = λI` and every
/// vector qualifies; the standard basis vector `e_index` keeps repeated
/// eigenvalues paired with independent eigenvectors.
fn null_vector(m: &Matrix2<f64>, lambda: Complex64, index: usize) -> Vector2<Complex64> {
    let shifted = m.map(|v| Complex64::new(v, 0.0)) - Matrix2::from_diagonal_element(lambda);

    let modulus = |z: Complex64| z.norm_sqr().sqrt();
    let row_weight = |r: usize| modulus(shifted[(r, 0)]) + modulus(shifted[(r, 1)]);
    // relative to the largest entry, so `c·A` picks the same vectors as `A`;
    // the zero matrix gets a zero tolerance and falls back to the basis
    let tolerance = 1e-12 * m.amax();

    let row = if row_weight(0) >= row_weight(1) { 0 } else { 1 };
    if row_weight(row) <= tolerance {
        let mut basis = Vector2::<Complex64>::zeros();
        basis[index] = Complex64::new(1.0, 0.0);
        return basis;
    }
    Vector2::new(shifted[(row, 1)], -shifted[(row, 0)])
}

/// Determinant of a 2x2 matrix, `a*d - b*c` for `[[a, b], [c, d]]`.
///
/// # Errors
///
/// `ComputeError::Shape` if `matrix` is not 2x2.
pub fn compute_determinant<S>(matrix: &ArrayBase<S, Ix2>) -> ComputeResult<f64>
where
    S: Data<Elem = f64>,
{
    Ok(to_matrix2(matrix)?.determinant())
}

/// Points for drawing a `size x size` reference grid over
/// `[-range, range]²`.
///
/// The first `size²` rows trace the horizontal lines (x varies fastest, y
/// fixed per line); the next `size²` rows trace the vertical lines (y varies
/// fastest). Intersections therefore appear twice, which is what a client
/// drawing connected polylines needs.
pub fn generate_grid(size: usize, range: f64) -> Array2<f64> {
    let axis = Array1::linspace(-range, range, size);
    let half = size * size;

    Array2::from_shape_fn((2 * half, 2), |(row, col)| {
        let (x, y) = if row < half {
            (axis[row % size], axis[row / size])
        } else {
            let k = row - half;
            (axis[k / size], axis[k % size])
        };
        if col == 0 {
            x
        } else {
            y
        }
    })
}

/// Output of [`compute_pca`].
#[derive(Debug, Clone, PartialEq)]
pub struct PcaResult {
    /// Unit principal axes as columns, by decreasing variance.
    pub principal_components: Array2<f64>,
    /// Fraction of total variance per component; sums to 1.
    pub explained_variance: Array1<f64>,
    /// Centred data expressed in the principal basis, `(n, 2)`.
    pub projected_data: Array2<f64>,
    /// Column means removed before the decomposition.
    pub mean: Array1<f64>,
}

/// Principal component analysis of `(n, 2)` data.
///
/// Centres the data, eigendecomposes the sample covariance (n - 1
/// normalisation), orders components by decreasing eigenvalue, and projects
/// the centred data onto them. Constant data has a zero covariance matrix;
/// its explained variance comes out as NaN and is passed through.
///
/// # Errors
///
/// * `ComputeError::Shape` if `data` does not have two columns.
/// * `ComputeError::Value` with fewer than two rows, non-finite input, or if
///   the eigensolver fails to converge.
pub fn compute_pca<S>(data: &ArrayBase<S, Ix2>) -> ComputeResult<PcaResult>
where
    S: Data<Elem = f64>,
{
    require_points(data, "Data")?;
    let n_samples = data.nrows();
    if n_samples < 2 {
        return Err(ComputeError::value(format!(
            "PCA requires at least 2 samples, got {}",
            n_samples
        )));
    }
    require_finite(data.iter())?;

    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| ComputeError::value("Cannot take the mean of empty data"))?;
    let centered = data - &mean;
    let covariance = centered.t().dot(&centered) / (n_samples - 1) as f64;

    let eigen = SymmetricEigen::try_new(to_matrix2(&covariance)?, f64::EPSILON, PCA_MAX_ITERATIONS)
        .ok_or_else(|| ComputeError::value("Covariance eigendecomposition did not converge"))?;

    let mut order = [0usize, 1];
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(Ordering::Equal)
    });

    let mut principal_components = Array2::<f64>::zeros((2, 2));
    let mut variances = Array1::<f64>::zeros(2);
    for (dst, &src) in order.iter().enumerate() {
        let axis = eigen.eigenvectors.column(src);
        let norm = axis.norm();
        for r in 0..2 {
            principal_components[[r, dst]] = axis[r] / norm;
        }
        variances[dst] = eigen.eigenvalues[src];
    }

    let projected_data = centered.dot(&principal_components);
    let total = variances.sum();
    let explained_variance = variances.mapv(|v| v / total);

    log::debug!(
        "PCA on {} samples: explained variance {:?}",
        n_samples,
        explained_variance.as_slice()
    );

    Ok(PcaResult {
        principal_components,
        explained_variance,
        projected_data,
        mean,
    })
}

/// Counter-clockwise rotation by `angle` radians.
pub fn rotation_matrix(angle: f64) -> Array2<f64> {
    let (sin_a, cos_a) = angle.sin_cos();
    array![[cos_a, -sin_a], [sin_a, cos_a]]
}

pub fn scale_matrix(sx: f64, sy: f64) -> Array2<f64> {
    array![[sx, 0.0], [0.0, sy]]
}

/// Axis a reflection mirrors across.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectionAxis {
    X,
    Y,
}

impl FromStr for ReflectionAxis {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(ReflectionAxis::X),
            "y" => Ok(ReflectionAxis::Y),
            _ => Err(ComputeError::value("Axis must be 'x' or 'y'")),
        }
    }
}

/// Reflection across the named axis (`"x"` or `"y"`).
///
/// # Errors
///
/// `ComputeError::Value` for any other axis name.
pub fn reflection_matrix(axis: &str) -> ComputeResult<Array2<f64>> {
    Ok(match axis.parse::<ReflectionAxis>()? {
        ReflectionAxis::X => array![[1.0, 0.0], [0.0, -1.0]],
        ReflectionAxis::Y => array![[-1.0, 0.0], [0.0, 1.0]],
    })
}

pub fn shear_matrix(kx: f64, ky: f64) -> Array2<f64> {
    array![[1.0, kx], [ky, 1.0]]
}
