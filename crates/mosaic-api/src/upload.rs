//! Multipart CSV uploads.
use axum::body::Bytes;
use axum::extract::Multipart;
use std::collections::HashMap;
use std::str::FromStr;

use mosaic_compute::data_handling::Dataset;
use mosaic_compute::io::read_csv_bytes;

use crate::error::{ApiError, ApiResult};

/// Form part holding the file.
pub const FILE_FIELD: &str = "file";

/// A buffered multipart form: the `file` part plus any text fields.
#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub filename: Option<String>,
    pub content: Bytes,
    fields: HashMap<String, String>,
}

impl CsvUpload {
    /// Drain the multipart stream. The `file` part is required.
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut file = None;
        let mut fields = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == FILE_FIELD {
                let filename = field.file_name().map(str::to_string);
                let content = field.bytes().await?;
                file = Some((filename, content));
            } else {
                let value = field.text().await?;
                fields.insert(name, value);
            }
        }

        let (filename, content) =
            file.ok_or_else(|| ApiError::bad_request("Missing form field 'file'"))?;
        log::debug!(
            "Received upload {:?} ({} bytes, {} extra fields)",
            filename,
            content.len(),
            fields.len()
        );
        Ok(CsvUpload {
            filename,
            content,
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn required_field(&self, name: &str) -> ApiResult<&str> {
        self.field(name)
            .ok_or_else(|| ApiError::bad_request(format!("Missing form field '{}'", name)))
    }

    /// Parse an optional field, falling back to `default` when absent.
    pub fn parsed_field_or<T: FromStr>(&self, name: &str, default: T) -> ApiResult<T> {
        match self.field(name) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|_| {
                ApiError::unprocessable(format!("Form field '{}' has invalid value '{}'", name, raw))
            }),
        }
    }

    pub fn dataset(&self) -> ApiResult<Dataset> {
        Ok(read_csv_bytes(&self.content)?)
    }
}

/// Accept only filenames ending in `.csv`. The match is case-sensitive, so
/// `data.CSV` is rejected.
pub fn validate_csv_filename(filename: Option<&str>) -> ApiResult<()> {
    match filename {
        Some(name) if name.ends_with(".csv") => Ok(()),
        _ => Err(ApiError::bad_request("File must be a CSV file")),
    }
}
