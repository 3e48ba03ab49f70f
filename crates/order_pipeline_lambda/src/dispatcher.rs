use futures::future::join_all;
use order_pipeline_core::contract::{
    CanonicalOrder, PartialFailureReport, PipelineError, QueueEnvelope,
};
use order_pipeline_core::sharding::KeyDeriver;
use order_pipeline_core::storage_keys::{order_item, StorageKey};
use tracing::{debug, error, info};

use crate::adapters::order_store::OrderStore;

const COMPONENT: &str = "consumer_dispatcher";

/// Persists a delivered batch of order messages and reports which deliveries
/// failed.
pub struct ConsumerDispatcher<'a, S: OrderStore + ?Sized> {
    store: &'a S,
    key_deriver: KeyDeriver,
}

impl<'a, S: OrderStore + ?Sized> ConsumerDispatcher<'a, S> {
    pub fn new(store: &'a S, key_deriver: KeyDeriver) -> Self {
        Self { store, key_deriver }
    }

    /// Processes every envelope concurrently and waits for all of them.
    ///
    /// One envelope failing never cancels another. The report lists the
    /// failed delivery ids in input order; everything else is acknowledged.
    pub async fn dispatch(&self, envelopes: &[QueueEnvelope]) -> PartialFailureReport {
        if envelopes.is_empty() {
            info!(
                component = COMPONENT,
                event = "empty_batch",
                "no messages received"
            );
            return PartialFailureReport::default();
        }

        info!(
            component = COMPONENT,
            event = "batch_received",
            messages = envelopes.len(),
            "dispatching messages"
        );

        let outcomes = join_all(
            envelopes
                .iter()
                .map(|envelope| self.process_envelope(envelope)),
        )
        .await;

        let failed_ids: Vec<String> = envelopes
            .iter()
            .zip(outcomes)
            .filter_map(|(envelope, outcome)| match outcome {
                Ok(_) => None,
                Err(failure) => {
                    error!(
                        component = COMPONENT,
                        event = "envelope_failed",
                        delivery_id = %envelope.delivery_id,
                        retryable = failure.is_retryable(),
                        error = %failure,
                        "message processing failed"
                    );
                    Some(envelope.delivery_id.clone())
                }
            })
            .collect();

        info!(
            component = COMPONENT,
            event = "dispatch_completed",
            messages = envelopes.len(),
            failures = failed_ids.len(),
            "batch processing complete"
        );

        PartialFailureReport::from_delivery_ids(failed_ids)
    }

    async fn process_envelope(
        &self,
        envelope: &QueueEnvelope,
    ) -> Result<StorageKey, PipelineError> {
        debug!(
            component = COMPONENT,
            event = "envelope_started",
            delivery_id = %envelope.delivery_id,
            body = envelope.body.as_deref().unwrap_or_default(),
            "processing message"
        );

        let order = decode_order(envelope)?;
        let key = self.key_deriver.derive(&order)?;

        self.store
            .put_item(order_item(&order, key.clone()))
            .await
            .map_err(PipelineError::StoreWriteFailure)?;

        info!(
            component = COMPONENT,
            event = "order_saved",
            delivery_id = %envelope.delivery_id,
            order_id = %order.id,
            pk = %key.partition_key,
            sk = %key.sort_key,
            "order saved"
        );
        Ok(key)
    }
}

fn decode_order(envelope: &QueueEnvelope) -> Result<CanonicalOrder, PipelineError> {
    let body = envelope.body.as_deref().ok_or_else(|| {
        PipelineError::ConsumerDeserializationFailure("message body is missing".to_string())
    })?;

    serde_json::from_str(body)
        .map_err(|error| PipelineError::ConsumerDeserializationFailure(error.to_string()))
}
