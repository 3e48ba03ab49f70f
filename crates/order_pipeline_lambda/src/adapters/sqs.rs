use async_trait::async_trait;
use aws_sdk_sqs::types::{BatchResultErrorEntry, SendMessageBatchRequestEntry};
use order_pipeline_core::contract::{BatchResult, FailedEntry, QueueEntry};

use crate::adapters::queue::OrderQueue;

#[derive(Debug, Clone)]
pub struct SqsOrderQueue {
    queue_url: String,
    client: aws_sdk_sqs::Client,
}

impl SqsOrderQueue {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            client,
        }
    }
}

#[async_trait]
impl OrderQueue for SqsOrderQueue {
    async fn send_batch(&self, entries: &[QueueEntry]) -> Result<BatchResult, String> {
        let request_entries = entries
            .iter()
            .map(|entry| {
                SendMessageBatchRequestEntry::builder()
                    .id(&entry.entry_id)
                    .message_body(&entry.body)
                    .build()
                    .map_err(|error| format!("invalid sqs batch entry {}: {error}", entry.entry_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output = self
            .client
            .send_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(request_entries))
            .send()
            .await
            .map_err(|error| format!("failed to send sqs message batch: {error}"))?;

        Ok(BatchResult {
            succeeded: output.successful().len(),
            failed: output
                .failed()
                .iter()
                .map(|failure| failed_entry(failure, entries))
                .collect(),
        })
    }
}

fn failed_entry(failure: &BatchResultErrorEntry, entries: &[QueueEntry]) -> FailedEntry {
    FailedEntry {
        entry_id: failure.id().to_string(),
        order_id: entries
            .iter()
            .find(|entry| entry.entry_id == failure.id())
            .map(|entry| entry.order_id.clone()),
        code: failure.code().to_string(),
        reason: failure.message().unwrap_or(failure.code()).to_string(),
        sender_fault: failure.sender_fault(),
    }
}
