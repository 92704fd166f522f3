//! CSV reader producing a typed `Dataset`.
use std::collections::HashSet;
use std::io::Read;

use csv::StringRecord;

use crate::data_handling::{Column, ColumnData, Dataset};
use crate::error::{ComputeError, ComputeResult};

/// Cell contents treated as missing values (compared after trimming).
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: &[&str] = &["true", "True", "TRUE"];
const FALSE_VALUES: &[&str] = &["false", "False", "FALSE"];

/// Read a header-first CSV into a `Dataset`.
///
/// Column types are inferred per column: integers (only when no value is
/// missing), floats, booleans, and otherwise text. Short rows are padded
/// with missing values; rows with more fields than the header are an error.
///
/// # Errors
///
/// `ComputeError::Parse` for malformed CSV, an empty input, or overlong rows.
pub fn read_csv<R: Read>(reader: R) -> ComputeResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ComputeError::Parse("No columns to parse from file".to_string()));
    }
    let names = unique_column_names(&headers);
    let n_cols = names.len();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > n_cols {
            // header is line 1
            return Err(ComputeError::Parse(format!(
                "Expected {} fields in line {}, saw {}",
                n_cols,
                row_idx + 2,
                record.len()
            )));
        }
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            let value = record.get(col_idx).filter(|v| !NA_VALUES.contains(v));
            cells.push(value.map(str::to_string));
        }
    }

    let columns = names
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_column(name, cells))
        .collect::<Vec<_>>();

    let dataset = Dataset::new(columns)?;
    log::debug!(
        "Read CSV with {} rows, {} columns ({} numeric)",
        dataset.nrows(),
        dataset.ncols(),
        dataset.numeric_columns().count()
    );
    Ok(dataset)
}

/// Convenience wrapper over [`read_csv`] for an in-memory upload.
pub fn read_csv_bytes(bytes: &[u8]) -> ComputeResult<Dataset> {
    read_csv(bytes)
}

/// Blank headers become `Unnamed: <idx>`; repeats of a name get `.1`, `.2`, ...
fn unique_column_names(headers: &StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            header.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }
    names
}

fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    let present = || cells.iter().flatten();
    let has_missing = cells.iter().any(Option::is_none);

    if !has_missing && present().all(|v| v.parse::<i64>().is_ok()) {
        let values = present().filter_map(|v| v.parse::<i64>().ok()).collect();
        return Column::new(name, ColumnData::Int(values));
    }

    if present().all(|v| v.parse::<f64>().is_ok()) {
        let values = cells
            .iter()
            .map(|cell| {
                cell.as_deref()
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|v| !v.is_nan())
            })
            .collect();
        return Column::new(name, ColumnData::Float(values));
    }

    if present().all(|v| parse_bool(v).is_some()) {
        let values = cells
            .iter()
            .map(|cell| cell.as_deref().and_then(parse_bool))
            .collect();
        return Column::new(name, ColumnData::Bool(values));
    }

    Column::new(name, ColumnData::Text(cells))
}

fn parse_bool(value: &str) -> Option<bool> {
    if TRUE_VALUES.contains(&value) {
        Some(true)
    } else if FALSE_VALUES.contains(&value) {
        Some(false)
    } else {
        None
    }
}
