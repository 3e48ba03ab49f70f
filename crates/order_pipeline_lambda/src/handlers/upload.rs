use order_pipeline_core::contract::{
    CanonicalOrder, FailedEntry, PipelineError, RawOrderRow, RejectedRow,
};
use order_pipeline_core::normalize::normalize_rows;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::adapters::queue::OrderQueue;
use crate::multipart::{decode_upload_event, extract_rows};
use crate::publisher::BatchPublisher;

const COMPONENT: &str = "upload_handler";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadAcceptedResponse {
    pub message: String,
    pub orders: Vec<CanonicalOrder>,
    pub rejected: Vec<RejectedRow>,
    pub failed_entries: Vec<FailedEntry>,
}

/// Parses an uploaded CSV, normalizes its rows and publishes them.
///
/// 400 when the upload cannot be parsed (nothing is published), 500 when a
/// batch cannot be submitted, 200 otherwise. Rejected rows and entries the
/// queue refused are listed in the 200 body.
pub async fn handle_upload_event(
    event: Value,
    queue: &(impl OrderQueue + ?Sized),
) -> ApiGatewayResponse {
    let rows = match decode_upload(event).await {
        Ok(rows) => rows,
        Err(failure) => {
            error!(
                component = COMPONENT,
                event = "upload_rejected",
                error = %failure,
                "csv parsing error"
            );
            return failure_response(&failure);
        }
    };

    info!(
        component = COMPONENT,
        event = "rows_parsed",
        rows = rows.len(),
        "parsed upload"
    );

    let normalized = normalize_rows(&rows);
    for rejected in &normalized.rejected {
        warn!(
            component = COMPONENT,
            event = "row_rejected",
            row = rejected.row,
            reason = %rejected.reason,
            "row excluded from publishing"
        );
    }

    let summary = match BatchPublisher::new(queue).publish(&normalized.orders).await {
        Ok(summary) => summary,
        Err(failure) => {
            error!(
                component = COMPONENT,
                event = "publish_failed",
                error = %failure,
                "queue error"
            );
            return failure_response(&failure);
        }
    };

    if let Some(partial) = summary.partial_failure() {
        error!(
            component = COMPONENT,
            event = "publish_incomplete",
            retryable = partial.is_retryable(),
            error = %partial,
            "some orders were not queued"
        );
    }

    success_response(UploadAcceptedResponse {
        message: format!("Processed {} orders", normalized.orders.len()),
        orders: normalized.orders,
        rejected: normalized.rejected,
        failed_entries: summary.failed,
    })
}

async fn decode_upload(event: Value) -> Result<Vec<RawOrderRow>, PipelineError> {
    let upload = decode_upload_event(event)?;
    extract_rows(&upload).await
}

fn success_response(payload: UploadAcceptedResponse) -> ApiGatewayResponse {
    match serde_json::to_string(&payload) {
        Ok(body) => ApiGatewayResponse {
            status_code: 200,
            headers: json!({"Content-Type": "application/json"}),
            body,
        },
        Err(error) => failure_response(&PipelineError::Serialization(error.to_string())),
    }
}

fn failure_response(failure: &PipelineError) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code: failure.status_code(),
        headers: json!({"Content-Type": "application/json"}),
        body: json!({ "error": failure.to_string() }).to_string(),
    }
}
