use order_pipeline_core::contract::{PartialFailureReport, QueueEnvelope};
use order_pipeline_core::sharding::KeyDeriver;
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::order_store::OrderStore;
use crate::dispatcher::ConsumerDispatcher;

const COMPONENT: &str = "queue_handler";

/// Persists an SQS delivery batch; never fails past this boundary.
pub async fn handle_queue_event(
    event: &Value,
    store: &(impl OrderStore + ?Sized),
    key_deriver: KeyDeriver,
) -> PartialFailureReport {
    let envelopes = decode_envelopes(event);
    info!(
        component = COMPONENT,
        event = "messages_received",
        messages = envelopes.len(),
        "received messages from queue"
    );

    ConsumerDispatcher::new(store, key_deriver)
        .dispatch(&envelopes)
        .await
}

/// Reads `Records[*].messageId` and `Records[*].body`.
///
/// A missing `Records` array is an empty batch. Records without a string
/// `messageId` cannot be reported back to the queue and are skipped; a
/// non-string body is kept as `None` so the delivery fails on its own.
pub fn decode_envelopes(event: &Value) -> Vec<QueueEnvelope> {
    let Some(records) = event.get("Records").and_then(Value::as_array) else {
        return Vec::new();
    };

    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let Some(delivery_id) = record.get("messageId").and_then(Value::as_str) else {
                error!(
                    component = COMPONENT,
                    event = "record_skipped",
                    index,
                    "record has no messageId"
                );
                return None;
            };

            Some(QueueEnvelope {
                delivery_id: delivery_id.to_string(),
                body: record
                    .get("body")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}
