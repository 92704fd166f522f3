//! HTTP layer of the Mosaic service.
//!
//! Two groups of endpoints share one router: `vektor` for 2D linear algebra
//! on JSON bodies and `statlab` for statistics on uploaded CSV files. All
//! numeric work lives in `mosaic_compute`; this crate only validates,
//! converts and serializes.
pub mod config;
pub mod error;
pub mod routes;
pub mod upload;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use routes::router;
