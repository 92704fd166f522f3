//! Integration tests for the 2D linear algebra routines.

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use mosaic_compute::linalg::{
    compute_determinant, compute_eigen, compute_pca, generate_grid, reflection_matrix,
    rotation_matrix, scale_matrix, shear_matrix, transform_points, ReflectionAxis,
};
use mosaic_compute::math::{array2_from_rows, points_from_rows};
use mosaic_compute::ComputeError;
use ndarray::{array, Array2};
use rand::{Rng, SeedableRng};

fn assert_points_eq(actual: &Array2<f64>, expected: &Array2<f64>) {
    assert_eq!(actual.dim(), expected.dim());
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*a, *e, epsilon = 1e-9);
    }
}

// ---------------------------------------------------------------------------
// transform_points
// ---------------------------------------------------------------------------

#[test]
fn identity_matrix_leaves_points_unchanged() {
    let points = array![[1.0, 0.0], [0.0, 1.0], [2.0, 3.0]];
    let identity = array![[1.0, 0.0], [0.0, 1.0]];
    let result = transform_points(&points, &identity).unwrap();
    assert_points_eq(&result, &points);
}

#[test]
fn rotation_by_90_degrees_maps_x_to_y() {
    let points = array![[1.0, 0.0]];
    let matrix = array![[0.0, -1.0], [1.0, 0.0]];
    let result = transform_points(&points, &matrix).unwrap();
    assert_points_eq(&result, &array![[0.0, 1.0]]);
}

#[test]
fn scaling_multiplies_coordinates() {
    let points = array![[1.0, 2.0], [3.0, 4.0]];
    let matrix = array![[2.0, 0.0], [0.0, 3.0]];
    let result = transform_points(&points, &matrix).unwrap();
    assert_points_eq(&result, &array![[2.0, 6.0], [6.0, 12.0]]);
}

#[test]
fn uniform_scale_scenario() {
    let points = points_from_rows(&[vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap();
    let matrix = array2_from_rows(&[vec![2.0, 0.0], vec![0.0, 2.0]]).unwrap();
    let result = transform_points(&points, &matrix).unwrap();
    assert_eq!(result, array![[2.0, 2.0], [4.0, 4.0]]);
}

#[test]
fn transform_rejects_non_2x2_matrix() {
    let points = array![[1.0, 0.0]];
    let matrix = Array2::<f64>::eye(3);
    let err = transform_points(&points, &matrix).unwrap_err();
    assert!(err.is_shape());
    assert!(err.to_string().contains("Matrix must be 2x2"), "{}", err);
}

#[test]
fn transform_rejects_three_column_points() {
    let points = array![[1.0, 0.0, 2.0]];
    let matrix = Array2::<f64>::eye(2);
    assert!(transform_points(&points, &matrix).unwrap_err().is_shape());
}

#[test]
fn transform_of_empty_point_set_is_empty() {
    let points = points_from_rows(&[]).unwrap();
    assert_eq!(points.dim(), (0, 2));
    let result = transform_points(&points, &Array2::<f64>::eye(2)).unwrap();
    assert_eq!(result.dim(), (0, 2));
}

#[test]
fn transform_single_point_with_large_values() {
    let points = array![[1.0, 1.0]];
    let matrix = array![[100.0, 0.0], [0.0, 100.0]];
    let result = transform_points(&points, &matrix).unwrap();
    assert_points_eq(&result, &array![[100.0, 100.0]]);
}

#[test]
fn ragged_rows_are_a_shape_error() {
    let err = array2_from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
    assert_eq!(
        err,
        ComputeError::RaggedRows {
            row: 1,
            expected: 2,
            found: 1
        }
    );
    assert!(err.is_shape());
}

// ---------------------------------------------------------------------------
// compute_eigen
// ---------------------------------------------------------------------------

fn sorted_real_parts(matrix: &Array2<f64>) -> Vec<f64> {
    let eigen = compute_eigen(matrix).unwrap();
    let mut values: Vec<f64> = eigen.eigenvalues.iter().map(|c| c.re).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    values
}

#[test]
fn identity_eigenvalues_are_one() {
    let values = sorted_real_parts(&Array2::eye(2));
    assert_abs_diff_eq!(values[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(values[1], 1.0, epsilon = 1e-12);
}

#[test]
fn diagonal_eigenvalues_are_the_diagonal() {
    let values = sorted_real_parts(&array![[2.0, 0.0], [0.0, 3.0]]);
    assert_abs_diff_eq!(values[0], 2.0, epsilon = 1e-10);
    assert_abs_diff_eq!(values[1], 3.0, epsilon = 1e-10);
}

#[test]
fn eigenvectors_have_unit_norm_and_satisfy_definition() {
    let matrices = [
        array![[2.0, 0.0], [0.0, 3.0]],
        array![[4.0, 1.0], [2.0, 3.0]],
        array![[2.0, 0.0], [1.0, 3.0]],
        array![[1.0, 2.0], [2.0, 4.0]],
        Array2::eye(2),
    ];
    for matrix in matrices.iter() {
        let eigen = compute_eigen(matrix).unwrap();
        for j in 0..2 {
            let v = eigen.eigenvectors.column(j);
            let norm = (v[0].norm_sqr() + v[1].norm_sqr()).sqrt();
            assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-10);

            let lambda = eigen.eigenvalues[j];
            for r in 0..2 {
                let av = v[0] * matrix[[r, 0]] + v[1] * matrix[[r, 1]];
                let lv = v[r] * lambda;
                assert!((av - lv).norm_sqr().sqrt() < 1e-8, "A v != λ v for {:?}", matrix);
            }
        }
    }
}

#[test]
fn rotation_has_complex_conjugate_eigenvalues() {
    let eigen = compute_eigen(&array![[0.0, -1.0], [1.0, 0.0]]).unwrap();
    let mut imag: Vec<f64> = eigen.eigenvalues.iter().map(|c| c.im).collect();
    imag.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_abs_diff_eq!(imag[0], -1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(imag[1], 1.0, epsilon = 1e-10);
    for c in eigen.eigenvalues.iter() {
        assert_abs_diff_eq!(c.re, 0.0, epsilon = 1e-10);
    }
}

#[test]
fn tiny_scalar_matrix_gets_basis_eigenvectors() {
    let eigen = compute_eigen(&(Array2::<f64>::eye(2) * 1e-20)).unwrap();
    for j in 0..2 {
        assert_abs_diff_eq!(eigen.eigenvalues[j].re, 1e-20, epsilon = 1e-32);
        let v = eigen.eigenvectors.column(j);
        assert_abs_diff_eq!(v[j].norm_sqr(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v[1 - j].norm_sqr(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn tiny_defective_matrix_is_not_mistaken_for_scalar() {
    // a Jordan block has the single eigenvector (1, 0) at every scale
    for scale in [1.0, 1e-20] {
        let matrix = array![[1.0, 1.0], [0.0, 1.0]] * scale;
        let eigen = compute_eigen(&matrix).unwrap();
        for j in 0..2 {
            let v = eigen.eigenvectors.column(j);
            assert_abs_diff_eq!(v[0].norm_sqr(), 1.0, epsilon = 1e-8);
            assert_abs_diff_eq!(v[1].norm_sqr(), 0.0, epsilon = 1e-8);

            let lambda = eigen.eigenvalues[j];
            for r in 0..2 {
                let av = v[0] * matrix[[r, 0]] + v[1] * matrix[[r, 1]];
                let residual = (av - v[r] * lambda).norm_sqr().sqrt();
                assert!(residual <= 1e-8 * scale, "scale {}: residual {}", scale, residual);
            }
        }
    }
}

#[test]
fn eigen_rejects_3x3() {
    let err = compute_eigen(&Array2::<f64>::eye(3)).unwrap_err();
    assert!(err.to_string().contains("Matrix must be 2x2"));
}

// ---------------------------------------------------------------------------
// compute_determinant
// ---------------------------------------------------------------------------

#[test]
fn determinant_of_identity_is_one() {
    assert_eq!(compute_determinant(&Array2::<f64>::eye(2)).unwrap(), 1.0);
}

#[test]
fn determinant_of_diagonal_is_product() {
    assert_eq!(compute_determinant(&array![[2.0, 0.0], [0.0, 3.0]]).unwrap(), 6.0);
}

#[test]
fn determinant_matches_ad_minus_bc() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let (a, b, c, d): (f64, f64, f64, f64) = (
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        );
        let det = compute_determinant(&array![[a, b], [c, d]]).unwrap();
        assert_abs_diff_eq!(det, a * d - b * c, epsilon = 1e-9);
    }
    let det = compute_determinant(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
    assert_abs_diff_eq!(det, -2.0, epsilon = 1e-10);
}

#[test]
fn singular_matrix_has_zero_determinant() {
    let det = compute_determinant(&array![[1.0, 2.0], [2.0, 4.0]]).unwrap();
    assert!(det.abs() < 1e-10);
}

#[test]
fn determinant_rejects_2x3() {
    let matrix = array2_from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let err = compute_determinant(&matrix).unwrap_err();
    assert_eq!(err.to_string(), "Matrix must be 2x2, got shape (2, 3)");
}

// ---------------------------------------------------------------------------
// generate_grid
// ---------------------------------------------------------------------------

#[test]
fn grid_has_two_rasters() {
    let grid = generate_grid(10, 5.0);
    assert_eq!(grid.dim(), (2 * 10 * 10, 2));
}

#[test]
fn grid_stays_within_range() {
    let grid = generate_grid(5, 2.0);
    assert_eq!(grid.nrows(), 50);
    assert!(grid.iter().all(|&v| (-2.0..=2.0).contains(&v)));
}

#[test]
fn grid_traverses_horizontal_then_vertical_lines() {
    let grid = generate_grid(3, 1.0);
    // horizontal: x fastest, y fixed
    assert_eq!(grid.row(0).to_vec(), vec![-1.0, -1.0]);
    assert_eq!(grid.row(1).to_vec(), vec![0.0, -1.0]);
    assert_eq!(grid.row(2).to_vec(), vec![1.0, -1.0]);
    assert_eq!(grid.row(3).to_vec(), vec![-1.0, 0.0]);
    // vertical: y fastest, x fixed
    assert_eq!(grid.row(9).to_vec(), vec![-1.0, -1.0]);
    assert_eq!(grid.row(10).to_vec(), vec![-1.0, 0.0]);
    assert_eq!(grid.row(12).to_vec(), vec![0.0, -1.0]);
}

#[test]
fn empty_grid_has_no_points() {
    assert_eq!(generate_grid(0, 5.0).dim(), (0, 2));
}

// ---------------------------------------------------------------------------
// compute_pca
// ---------------------------------------------------------------------------

#[test]
fn pca_on_diagonal_line() {
    let data = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
    let result = compute_pca(&data).unwrap();

    assert_points_eq(&result.mean.clone().insert_axis(ndarray::Axis(0)), &array![[2.5, 2.5]]);
    assert_abs_diff_eq!(result.explained_variance[0], 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(result.explained_variance[1], 0.0, epsilon = 1e-10);

    // first axis is ±(1, 1)/√2
    let axis = result.principal_components.column(0);
    assert_abs_diff_eq!(axis[0].abs(), 1.0 / 2f64.sqrt(), epsilon = 1e-10);
    assert_abs_diff_eq!(axis[1].abs(), 1.0 / 2f64.sqrt(), epsilon = 1e-10);
    assert_eq!(result.projected_data.dim(), (4, 2));
}

#[test]
fn pca_components_are_2x2_and_variance_sums_to_one() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let data = Array2::from_shape_fn((20, 2), |_| rng.gen::<f64>());
    let result = compute_pca(&data).unwrap();

    assert_eq!(result.principal_components.dim(), (2, 2));
    assert_eq!(result.explained_variance.len(), 2);
    assert_abs_diff_eq!(result.explained_variance.sum(), 1.0, epsilon = 1e-10);
    assert!(result.explained_variance[0] >= result.explained_variance[1]);
    for j in 0..2 {
        let col = result.principal_components.column(j);
        assert_abs_diff_eq!(col.dot(&col), 1.0, epsilon = 1e-10);
    }
}

#[test]
fn pca_projection_preserves_total_variance() {
    let data = array![[2.0, 0.5], [-1.0, 1.5], [0.5, -2.0], [3.0, 1.0], [-2.5, -0.5]];
    let result = compute_pca(&data).unwrap();
    let centered = &data - &result.mean;
    let before: f64 = centered.iter().map(|v| v * v).sum();
    let after: f64 = result.projected_data.iter().map(|v| v * v).sum();
    assert_abs_diff_eq!(before, after, epsilon = 1e-9);
}

#[test]
fn pca_rejects_three_columns() {
    let data = Array2::<f64>::zeros((10, 3));
    let err = compute_pca(&data).unwrap_err();
    assert!(err.is_shape());
    assert!(err.to_string().starts_with("Data must be 2D"), "{}", err);
}

#[test]
fn pca_requires_two_samples() {
    let err = compute_pca(&array![[1.0, 2.0]]).unwrap_err();
    assert!(matches!(err, ComputeError::Value(_)));
}

#[test]
fn pca_on_constant_data_yields_nan_variance() {
    let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
    let result = compute_pca(&data).unwrap();
    assert!(result.explained_variance.iter().all(|v| v.is_nan()));
}

// ---------------------------------------------------------------------------
// Matrix builders
// ---------------------------------------------------------------------------

#[test]
fn rotation_matrix_rotates_unit_x() {
    for k in 0..12 {
        let theta = k as f64 * PI / 6.0;
        let result = transform_points(&array![[1.0, 0.0]], &rotation_matrix(theta)).unwrap();
        assert_abs_diff_eq!(result[[0, 0]], theta.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(result[[0, 1]], theta.sin(), epsilon = 1e-12);
    }
}

#[test]
fn scale_matrix_scales() {
    let result = transform_points(&array![[1.0, 1.0]], &scale_matrix(2.0, 3.0)).unwrap();
    assert_points_eq(&result, &array![[2.0, 3.0]]);
}

#[test]
fn reflections_flip_one_coordinate() {
    let x = transform_points(&array![[1.0, 1.0]], &reflection_matrix("x").unwrap()).unwrap();
    assert_points_eq(&x, &array![[1.0, -1.0]]);
    let y = transform_points(&array![[1.0, 1.0]], &reflection_matrix("y").unwrap()).unwrap();
    assert_points_eq(&y, &array![[-1.0, 1.0]]);
}

#[test]
fn reflection_rejects_unknown_axis() {
    let err = reflection_matrix("z").unwrap_err();
    assert_eq!(err, ComputeError::Value("Axis must be 'x' or 'y'".to_string()));
    assert!("X".parse::<ReflectionAxis>().is_err());
}

#[test]
fn shear_matrix_shears_along_x() {
    let result = transform_points(&array![[0.0, 1.0]], &shear_matrix(0.5, 0.0)).unwrap();
    assert_points_eq(&result, &array![[0.5, 1.0]]);
}
