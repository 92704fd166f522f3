//! Statistics endpoints over uploaded CSV files.
//!
//! Every route takes a multipart form whose `file` part is the CSV. The
//! table is parsed per request and dropped afterwards.
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use mosaic_compute::data_handling::{Cell, ColumnMap};
use mosaic_compute::stats::{
    compute_basic_stats, compute_correlation, prepare_histogram_data, prepare_scatter_data,
    CorrelationMatrix, Histogram, ScatterData, StatsResult,
};

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::upload::{validate_csv_filename, CsvUpload};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .route("/stats", post(stats))
        .route("/histogram", post(histogram))
        .route("/scatter", post(scatter))
        .route("/correlation", post(correlation))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub columns: Vec<String>,
    pub shape: (usize, usize),
    pub preview: Vec<ColumnMap<Cell>>,
    pub numeric_columns: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub statistics: StatsResult,
}

async fn read_upload(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<CsvUpload> {
    CsvUpload::from_multipart(multipart?).await
}

async fn upload(
    State(config): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let upload = read_upload(multipart).await?;
    validate_csv_filename(upload.filename.as_deref())?;

    let dataset = upload
        .dataset()
        .map_err(|e| e.context("Error parsing CSV"))?;
    log::debug!("Parsed {:?} with shape {:?}", upload.filename, dataset.shape());

    Ok(Json(UploadResponse {
        columns: dataset.column_names(),
        shape: dataset.shape(),
        preview: dataset.preview(config.preview_rows),
        numeric_columns: dataset.numeric_column_names(),
    }))
}

async fn stats(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<StatisticsResponse>> {
    let upload = read_upload(multipart).await?;
    let dataset = upload
        .dataset()
        .map_err(|e| e.context("Error computing statistics"))?;
    let statistics = compute_basic_stats(&dataset)
        .map_err(|e| ApiError::bad_input(e).context("Error computing statistics"))?;
    log::debug!("Computed statistics for {} columns", statistics.len());
    Ok(Json(StatisticsResponse { statistics }))
}

async fn histogram(
    State(config): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Histogram>> {
    let upload = read_upload(multipart).await?;
    let column = upload.required_field("column")?;
    let bins = upload.parsed_field_or("bins", config.default_bins)?;
    if bins > config.max_bins {
        return Err(ApiError::bad_request(format!(
            "bins must be at most {}, got {}",
            config.max_bins, bins
        )));
    }

    let dataset = upload
        .dataset()
        .map_err(|e| e.context("Error generating histogram"))?;
    // argument problems are reported verbatim
    let histogram = prepare_histogram_data(&dataset, column, bins).map_err(ApiError::bad_input)?;
    log::debug!("Histogram of '{}' with {} bins", column, bins);
    Ok(Json(histogram))
}

async fn scatter(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ScatterData>> {
    let upload = read_upload(multipart).await?;
    let x_column = upload.required_field("x_column")?;
    let y_column = upload.required_field("y_column")?;

    let dataset = upload
        .dataset()
        .map_err(|e| e.context("Error generating scatter plot"))?;
    let scatter = prepare_scatter_data(&dataset, x_column, y_column).map_err(ApiError::bad_input)?;
    log::debug!("Scatter of '{}' vs '{}': {} points", x_column, y_column, scatter.x.len());
    Ok(Json(scatter))
}

async fn correlation(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<CorrelationMatrix>> {
    let upload = read_upload(multipart).await?;
    let dataset = upload
        .dataset()
        .map_err(|e| e.context("Error computing correlation"))?;
    let correlation = compute_correlation(&dataset);
    log::debug!("Correlation over {} numeric columns", correlation.columns.len());
    Ok(Json(correlation))
}
