//! mosaic-compute: numeric building blocks for the Mosaic API.
//!
//! The crate holds the 2D linear algebra used by the vektor endpoints
//! (transforms, eigendecomposition, determinant, grids, PCA) and the tabular
//! statistics used by the statlab endpoints (summary statistics, histograms,
//! scatter pairs, correlation). The numerical work is done by `ndarray`,
//! `ndarray-stats`, `nalgebra` and `statrs`. This crate validates shapes and
//! arranges inputs and outputs.
pub mod data_handling;
pub mod error;
pub mod io;
pub mod linalg;
pub mod math;
pub mod stats;

pub use error::{ComputeError, ComputeResult};
