//! Array plumbing shared by the linear algebra and statistics modules.
//!
//! JSON requests carry matrices as nested rows; this module turns them into
//! `ndarray` arrays (where shapes can be checked) and, for decompositions,
//! into fixed-size `nalgebra` matrices.
pub mod matrix;
pub mod vector;

pub use matrix::{
    array2_from_rows, points_from_rows, require_finite, require_points, require_square2,
    rows_from_array2, to_matrix2,
};
pub use vector::{normalize_complex, Complex64};
