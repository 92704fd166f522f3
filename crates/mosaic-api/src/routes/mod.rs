//! Router assembly.
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::config::ServerConfig;

pub mod statlab;
pub mod vektor;

pub const VEKTOR_PREFIX: &str = "/api/data-science/vektor";
pub const STATLAB_PREFIX: &str = "/api/data-science/statlab";

/// Shared, read-only handler state.
pub type AppState = Arc<ServerConfig>;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Full application: health routes plus both endpoint groups.
pub fn router(config: AppState) -> Router {
    let body_limit = config.max_upload_bytes;
    Router::new()
        .route("/", get(root))
        .route("/hello", get(hello))
        .nest(VEKTOR_PREFIX, vektor::router())
        .nest(STATLAB_PREFIX, statlab::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(config)
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello from Mosaic!",
    })
}

async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello World! Mosaic is ready to go.",
    })
}
