use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BATCH_SIZE: usize = 10;
pub const DEFAULT_TABLE_NAME: &str = "Orders";
pub const DEFAULT_SHARD_COUNT: u32 = 5;

/// One parsed CSV line, keyed by header name.
pub type RawOrderRow = BTreeMap<String, String>;

/// Normalized order as it travels from the upload function to the store.
///
/// `id` is assigned once during normalization and carried verbatim through
/// the queue; the consumer never regenerates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalOrder {
    pub id: String,
    pub email: String,
    pub price: f64,
    pub products: Vec<String>,
    pub date: String,
}

/// One entry of a batched queue submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueEntry {
    pub entry_id: String,
    pub order_id: String,
    pub body: String,
}

/// One message as delivered to the consumer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueEnvelope {
    pub delivery_id: String,
    pub body: Option<String>,
}

impl QueueEnvelope {
    pub fn new(delivery_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            delivery_id: delivery_id.into(),
            body: Some(body.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailedEntry {
    pub entry_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub code: String,
    pub reason: String,
    pub sender_fault: bool,
}

/// Outcome of a single batched submission as reported by the queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: Vec<FailedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchItemFailure {
    #[serde(rename = "itemIdentifier")]
    pub item_identifier: String,
}

/// Consumer response naming the deliveries the queue should redeliver.
///
/// Serializes to the SQS partial batch response shape. Anything not listed is
/// acknowledged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartialFailureReport {
    #[serde(rename = "batchItemFailures")]
    pub batch_item_failures: Vec<BatchItemFailure>,
}

impl PartialFailureReport {
    pub fn from_delivery_ids(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            batch_item_failures: ids
                .into_iter()
                .map(|item_identifier| BatchItemFailure { item_identifier })
                .collect(),
        }
    }

    pub fn failed_delivery_ids(&self) -> Vec<&str> {
        self.batch_item_failures
            .iter()
            .map(|failure| failure.item_identifier.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.batch_item_failures.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RejectedRow {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("{0}")]
    MalformedUpload(String),
    #[error("row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },
    #[error("batch {batch_number} could not be submitted: {message}")]
    QueueSubmissionFailure { batch_number: usize, message: String },
    #[error("{} queue entries were rejected", .failed.len())]
    PartialPublishFailure { failed: Vec<FailedEntry> },
    #[error("invalid order payload: {0}")]
    ConsumerDeserializationFailure(String),
    #[error("cannot derive storage key: {0}")]
    InvalidStorageKey(String),
    #[error("{0}")]
    StoreWriteFailure(String),
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("{0}")]
    Configuration(String),
}

impl PipelineError {
    /// Whether the same work can succeed if attempted again unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::QueueSubmissionFailure { .. }
                | Self::PartialPublishFailure { .. }
                | Self::StoreWriteFailure(_)
        )
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::MalformedUpload(_) => 400,
            _ => 500,
        }
    }
}

pub fn stable_contract_json(value: impl Serialize) -> Result<String, PipelineError> {
    serde_json::to_string(&value).map_err(|error| PipelineError::Serialization(error.to_string()))
}
