use std::collections::HashMap;
use std::convert::Infallible;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use order_pipeline_core::contract::{PipelineError, RawOrderRow};
use serde::Deserialize;
use serde_json::Value;

/// The parts of an API Gateway proxy event the upload path reads.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UploadEvent {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub headers: Option<HashMap<String, Option<String>>>,
}

impl UploadEvent {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn decoded_body(&self) -> Result<Vec<u8>, PipelineError> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| PipelineError::MalformedUpload("No file uploaded".to_string()))?;

        if self.is_base64_encoded {
            BASE64.decode(body).map_err(|error| {
                PipelineError::MalformedUpload(format!("body is not valid base64: {error}"))
            })
        } else {
            Ok(body.as_bytes().to_vec())
        }
    }
}

pub fn decode_upload_event(event: Value) -> Result<UploadEvent, PipelineError> {
    serde_json::from_value(event)
        .map_err(|error| PipelineError::MalformedUpload(format!("Malformed request: {error}")))
}

/// Extracts every file part of the multipart body and parses each as CSV.
pub async fn extract_rows(event: &UploadEvent) -> Result<Vec<RawOrderRow>, PipelineError> {
    let body = event.decoded_body()?;
    let content_type = event
        .header("content-type")
        .ok_or_else(|| PipelineError::MalformedUpload("missing content-type header".to_string()))?;
    let boundary = multer::parse_boundary(content_type).map_err(|error| {
        PipelineError::MalformedUpload(format!("content-type is not multipart: {error}"))
    })?;

    let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(Bytes::from(body)) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut rows = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(malformed_multipart)? {
        if field.file_name().is_none() {
            continue;
        }
        let data = field.bytes().await.map_err(malformed_multipart)?;
        rows.extend(parse_csv_rows(&data)?);
    }

    Ok(rows)
}

/// Parses comma-separated text with a header line into one map per row.
/// Short rows are accepted; their missing trailing columns are absent.
pub fn parse_csv_rows(data: &[u8]) -> Result<Vec<RawOrderRow>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers().map_err(malformed_csv)?.clone();
    reader
        .records()
        .map(|record| {
            let record = record.map_err(malformed_csv)?;
            Ok(headers
                .iter()
                .zip(record.iter())
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect())
        })
        .collect()
}

fn malformed_multipart(error: multer::Error) -> PipelineError {
    PipelineError::MalformedUpload(format!("invalid multipart body: {error}"))
}

fn malformed_csv(error: csv::Error) -> PipelineError {
    PipelineError::MalformedUpload(format!("invalid csv: {error}"))
}
