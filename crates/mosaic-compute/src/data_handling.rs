//! Typed tabular data built from uploaded CSV files.
//!
//! A `Dataset` is an ordered list of named `Column`s. Each column carries a
//! typed payload (`ColumnData`); integer and float columns are the numeric
//! ones the statistics routines operate on. Cells are converted to `Cell`
//! values for JSON output.
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ComputeError, ComputeResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Every row present and integral.
    Int(Vec<i64>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single value as it appears in JSON output.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Missing,
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Int(_) | ColumnData::Float(_))
    }

    /// Value at `row`. A float NaN is reported as missing.
    pub fn cell(&self, row: usize) -> Cell {
        match &self.data {
            ColumnData::Int(v) => Cell::Int(v[row]),
            ColumnData::Float(v) => match v[row] {
                Some(x) if !x.is_nan() => Cell::Float(x),
                _ => Cell::Missing,
            },
            ColumnData::Bool(v) => v[row].map_or(Cell::Missing, Cell::Bool),
            ColumnData::Text(v) => v[row].clone().map_or(Cell::Missing, Cell::Text),
        }
    }

    /// Numeric view of the column, `None` for non-numeric columns.
    /// Missing entries (and NaN) are `None` inside the vector.
    pub fn numeric_values(&self) -> Option<Vec<Option<f64>>> {
        match &self.data {
            ColumnData::Int(v) => Some(v.iter().map(|&x| Some(x as f64)).collect()),
            ColumnData::Float(v) => Some(v.iter().map(|x| x.filter(|f| !f.is_nan())).collect()),
            _ => None,
        }
    }

    /// Present numeric values with missing entries dropped.
    pub fn present_values(&self) -> Option<Vec<f64>> {
        self.numeric_values()
            .map(|values| values.into_iter().flatten().collect())
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.cell(row).is_missing()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    nrows: usize,
}

impl Dataset {
    /// Assemble a dataset; all columns must have the same length.
    pub fn new(columns: Vec<Column>) -> ComputeResult<Self> {
        let nrows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != nrows) {
            return Err(ComputeError::value(format!(
                "Column '{}' has {} rows, expected {}",
                bad.name(),
                bad.len(),
                nrows
            )));
        }
        Ok(Self { columns, nrows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.numeric_columns().map(|c| c.name.clone()).collect()
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.columns.len())
    }

    /// The first `n` rows as column-ordered name → value maps.
    pub fn preview(&self, n: usize) -> Vec<ColumnMap<Cell>> {
        (0..self.nrows.min(n))
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.name.clone(), c.cell(row)))
                    .collect()
            })
            .collect()
    }
}

/// Insertion-ordered map keyed by column name.
///
/// Serializes as a JSON object whose keys follow the dataset's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> ColumnMap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        self.entries.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for ColumnMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(String, T)> for ColumnMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T: Serialize> Serialize for ColumnMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
