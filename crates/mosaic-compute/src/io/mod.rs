//! IO utilities for loading uploaded tabular files.

pub mod csv_table;

pub use csv_table::{read_csv, read_csv_bytes, NA_VALUES};
