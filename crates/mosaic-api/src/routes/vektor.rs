//! Linear algebra endpoints.
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use mosaic_compute::linalg::{
    compute_determinant, compute_eigen, compute_pca, generate_grid, transform_points, EigenResult,
    PcaResult,
};
use mosaic_compute::math::{array2_from_rows, points_from_rows, require_square2, rows_from_array2, Complex64};

use super::AppState;
use crate::error::{ApiError, ApiResult, JsonBody};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transform", post(transform))
        .route("/eigen", post(eigen))
        .route("/determinant", post(determinant))
        .route("/pca", post(pca))
}

#[derive(Debug, Deserialize)]
pub struct MatrixRequest {
    pub matrix: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct TransformRequest {
    pub matrix: Vec<Vec<f64>>,
    /// Points to transform; a grid is generated when absent.
    #[serde(default)]
    pub points: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub grid_size: Option<usize>,
    #[serde(default)]
    pub grid_range: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PcaRequest {
    pub data: Vec<Vec<f64>>,
}

#[derive(Debug, Serialize)]
pub struct TransformResponse {
    pub original: Vec<Vec<f64>>,
    pub transformed: Vec<Vec<f64>>,
    pub matrix: Vec<Vec<f64>>,
}

/// Complex numbers travel as `[re, im]`.
pub type ComplexPair = [f64; 2];

fn complex_pair(z: Complex64) -> ComplexPair {
    [z.re, z.im]
}

#[derive(Debug, Serialize)]
pub struct EigenResponse {
    pub eigenvalues: Vec<ComplexPair>,
    /// Row-major; column `j` pairs with `eigenvalues[j]`.
    pub eigenvectors: Vec<Vec<ComplexPair>>,
}

impl From<&EigenResult> for EigenResponse {
    fn from(result: &EigenResult) -> Self {
        let vectors = &result.eigenvectors;
        EigenResponse {
            eigenvalues: result.eigenvalues.iter().copied().map(complex_pair).collect(),
            eigenvectors: (0..vectors.nrows())
                .map(|r| (0..vectors.ncols()).map(|c| complex_pair(vectors[(r, c)])).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeterminantResponse {
    pub determinant: f64,
}

#[derive(Debug, Serialize)]
pub struct PcaResponse {
    pub original_data: Vec<Vec<f64>>,
    pub principal_components: Vec<Vec<f64>>,
    pub explained_variance: Vec<f64>,
    pub projected_data: Vec<Vec<f64>>,
    pub mean: Vec<f64>,
}

impl PcaResponse {
    fn new(data: &Array2<f64>, result: PcaResult) -> Self {
        PcaResponse {
            original_data: rows_from_array2(data),
            principal_components: rows_from_array2(&result.principal_components),
            explained_variance: to_vec(result.explained_variance),
            projected_data: rows_from_array2(&result.projected_data),
            mean: to_vec(result.mean),
        }
    }
}

fn to_vec(array: Array1<f64>) -> Vec<f64> {
    array.into_raw_vec()
}

async fn transform(
    State(config): State<AppState>,
    JsonBody(request): JsonBody<TransformRequest>,
) -> ApiResult<Json<TransformResponse>> {
    let matrix = array2_from_rows(&request.matrix)?;
    require_square2(&matrix)?;

    let points = match &request.points {
        Some(rows) => points_from_rows(rows)?,
        None => {
            let size = request.grid_size.unwrap_or(config.default_grid_size);
            if size > config.max_grid_size {
                return Err(ApiError::bad_request(format!(
                    "grid_size must be at most {}, got {}",
                    config.max_grid_size, size
                )));
            }
            let range = request.grid_range.unwrap_or(config.default_grid_range);
            generate_grid(size, range)
        }
    };

    let transformed = transform_points(&points, &matrix)?;
    log::debug!("Transformed {} points", transformed.nrows());

    Ok(Json(TransformResponse {
        original: rows_from_array2(&points),
        transformed: rows_from_array2(&transformed),
        matrix: rows_from_array2(&matrix),
    }))
}

async fn eigen(JsonBody(request): JsonBody<MatrixRequest>) -> ApiResult<Json<EigenResponse>> {
    let matrix = array2_from_rows(&request.matrix)?;
    let result = compute_eigen(&matrix)?;
    log::debug!("Eigenvalues {:?}", result.eigenvalues.as_slice());
    Ok(Json(EigenResponse::from(&result)))
}

async fn determinant(
    JsonBody(request): JsonBody<MatrixRequest>,
) -> ApiResult<Json<DeterminantResponse>> {
    let matrix = array2_from_rows(&request.matrix)?;
    let determinant = compute_determinant(&matrix)?;
    log::debug!("Determinant {}", determinant);
    Ok(Json(DeterminantResponse { determinant }))
}

async fn pca(JsonBody(request): JsonBody<PcaRequest>) -> ApiResult<Json<PcaResponse>> {
    let data = array2_from_rows(&request.data).map_err(ApiError::bad_input)?;
    let result = compute_pca(&data).map_err(ApiError::bad_input)?;
    Ok(Json(PcaResponse::new(&data, result)))
}
