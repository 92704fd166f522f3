use std::error::Error;
use std::fmt;

/// Errors raised by the linear algebra and statistics routines.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputeError {
    /// Array dimensions do not match what the operation requires.
    Shape {
        subject: &'static str,
        expected: &'static str,
        rows: usize,
        cols: usize,
    },
    /// Nested rows of different lengths cannot form a matrix.
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Invalid argument: unknown column, empty column, bad axis name.
    Value(String),
    /// Tabular input could not be read.
    Parse(String),
}

pub type ComputeResult<T> = Result<T, ComputeError>;

impl ComputeError {
    pub fn value(msg: impl Into<String>) -> Self {
        ComputeError::Value(msg.into())
    }

    /// True for the dimensionality failures (`Shape` and `RaggedRows`).
    pub fn is_shape(&self) -> bool {
        matches!(self, ComputeError::Shape { .. } | ComputeError::RaggedRows { .. })
    }
}

impl fmt::Display for ComputeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ComputeError::Shape {
                subject,
                expected,
                rows,
                cols,
            } => write!(
                f,
                "{} must be {}, got shape ({}, {})",
                subject, expected, rows, cols
            ),
            ComputeError::RaggedRows { row, expected, found } => write!(
                f,
                "Row {} has {} values, expected {}",
                row, found, expected
            ),
            ComputeError::Value(msg) => write!(f, "{}", msg),
            ComputeError::Parse(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for ComputeError {}

impl From<csv::Error> for ComputeError {
    fn from(err: csv::Error) -> Self {
        ComputeError::Parse(err.to_string())
    }
}
