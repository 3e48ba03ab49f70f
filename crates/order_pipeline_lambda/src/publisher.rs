use order_pipeline_core::batching::plan_batches;
use order_pipeline_core::contract::{CanonicalOrder, FailedEntry, PipelineError};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::adapters::queue::OrderQueue;

const COMPONENT: &str = "batch_publisher";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishSummary {
    pub batches_sent: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedEntry>,
}

impl PublishSummary {
    /// Entries the queue rejected, as a retryable error.
    pub fn partial_failure(&self) -> Option<PipelineError> {
        if self.failed.is_empty() {
            None
        } else {
            Some(PipelineError::PartialPublishFailure {
                failed: self.failed.clone(),
            })
        }
    }
}

/// Pushes canonical orders to the queue in fixed-size batches, one batch at a
/// time and in input order.
pub struct BatchPublisher<'a, Q: OrderQueue + ?Sized> {
    queue: &'a Q,
}

impl<'a, Q: OrderQueue + ?Sized> BatchPublisher<'a, Q> {
    pub fn new(queue: &'a Q) -> Self {
        Self { queue }
    }

    /// Submits every batch sequentially.
    ///
    /// Entries rejected by the queue are logged and collected without retry;
    /// the remaining batches still go out. A batch that cannot be submitted at
    /// all aborts the run and no later batch is attempted.
    pub async fn publish(
        &self,
        orders: &[CanonicalOrder],
    ) -> Result<PublishSummary, PipelineError> {
        let mut summary = PublishSummary::default();

        for batch in plan_batches(orders)? {
            let result = self.queue.send_batch(&batch.entries).await.map_err(|message| {
                error!(
                    component = COMPONENT,
                    event = "batch_failed",
                    batch_number = batch.batch_number,
                    entries = batch.entries.len(),
                    error = %message,
                    "batch submission failed"
                );
                PipelineError::QueueSubmissionFailure {
                    batch_number: batch.batch_number,
                    message,
                }
            })?;

            info!(
                component = COMPONENT,
                event = "batch_sent",
                batch_number = batch.batch_number,
                succeeded = result.succeeded,
                failed = result.failed.len(),
                "batch sent"
            );

            for failure in &result.failed {
                error!(
                    component = COMPONENT,
                    event = "entry_failed",
                    batch_number = batch.batch_number,
                    entry_id = %failure.entry_id,
                    order_id = failure.order_id.as_deref().unwrap_or_default(),
                    reason = %failure.reason,
                    "queue rejected entry"
                );
            }

            summary.batches_sent += 1;
            summary.succeeded += result.succeeded;
            summary.failed.extend(result.failed);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use order_pipeline_core::contract::{BatchResult, QueueEntry};

    use super::*;

    /// Records every submitted batch; fails calls listed in `fail_calls`
    /// (1-indexed) and rejects entries whose position is in `reject_positions`.
    struct CapturingQueue {
        batches: Mutex<Vec<Vec<QueueEntry>>>,
        fail_calls: Vec<usize>,
        reject_positions: Vec<usize>,
    }

    impl CapturingQueue {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                fail_calls: Vec::new(),
                reject_positions: Vec::new(),
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                fail_calls: vec![call],
                ..Self::new()
            }
        }

        fn rejecting(positions: Vec<usize>) -> Self {
            Self {
                reject_positions: positions,
                ..Self::new()
            }
        }

        fn batches(&self) -> Vec<Vec<QueueEntry>> {
            self.batches.lock().expect("poisoned mutex").clone()
        }
    }

    #[async_trait]
    impl OrderQueue for CapturingQueue {
        async fn send_batch(&self, entries: &[QueueEntry]) -> Result<BatchResult, String> {
            let call = {
                let mut batches = self.batches.lock().expect("poisoned mutex");
                batches.push(entries.to_vec());
                batches.len()
            };

            if self.fail_calls.contains(&call) {
                return Err("queue unreachable".to_string());
            }

            let failed: Vec<FailedEntry> = entries
                .iter()
                .enumerate()
                .filter(|(position, _)| self.reject_positions.contains(position))
                .map(|(_, entry)| FailedEntry {
                    entry_id: entry.entry_id.clone(),
                    order_id: Some(entry.order_id.clone()),
                    code: "InternalError".to_string(),
                    reason: "throttled".to_string(),
                    sender_fault: false,
                })
                .collect();

            Ok(BatchResult {
                succeeded: entries.len() - failed.len(),
                failed,
            })
        }
    }

    fn orders(count: usize) -> Vec<CanonicalOrder> {
        (0..count)
            .map(|index| CanonicalOrder {
                id: format!("order-{index}"),
                email: format!("user{index}@example.com"),
                price: 1.0 + index as f64,
                products: vec!["x".to_string()],
                date: "2024-01-01".to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn submits_ceil_n_over_batch_size_batches() {
        let queue = CapturingQueue::new();
        let summary = BatchPublisher::new(&queue)
            .publish(&orders(23))
            .await
            .expect("publish should succeed");

        let batches = queue.batches();
        assert_eq!(
            batches.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![10, 10, 3]
        );
        assert_eq!(summary.batches_sent, 3);
        assert_eq!(summary.succeeded, 23);
        assert!(summary.partial_failure().is_none());
    }

    #[tokio::test]
    async fn empty_input_submits_nothing() {
        let queue = CapturingQueue::new();
        let summary = BatchPublisher::new(&queue)
            .publish(&[])
            .await
            .expect("publish should succeed");

        assert!(queue.batches().is_empty());
        assert_eq!(summary, PublishSummary::default());
    }

    #[tokio::test]
    async fn total_failure_aborts_remaining_batches() {
        let queue = CapturingQueue::failing_on(2);
        let error = BatchPublisher::new(&queue)
            .publish(&orders(23))
            .await
            .expect_err("second batch should fail");

        assert_eq!(queue.batches().len(), 2);
        assert_eq!(
            error,
            PipelineError::QueueSubmissionFailure {
                batch_number: 2,
                message: "queue unreachable".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn rejected_entries_are_collected_without_aborting() {
        let queue = CapturingQueue::rejecting(vec![0]);
        let summary = BatchPublisher::new(&queue)
            .publish(&orders(12))
            .await
            .expect("partial failures should not abort");

        assert_eq!(queue.batches().len(), 2);
        assert_eq!(summary.succeeded, 10);
        assert_eq!(summary.failed.len(), 2);
        assert_eq!(summary.failed[0].order_id.as_deref(), Some("order-0"));
        assert_eq!(summary.failed[1].order_id.as_deref(), Some("order-10"));

        let error = summary.partial_failure().expect("partial failure expected");
        assert!(error.is_retryable());
    }

    #[tokio::test]
    async fn message_bodies_carry_serialized_orders() {
        let queue = CapturingQueue::new();
        let input = orders(3);
        BatchPublisher::new(&queue)
            .publish(&input)
            .await
            .expect("publish should succeed");

        let batches = queue.batches();
        let decoded: Vec<CanonicalOrder> = batches[0]
            .iter()
            .map(|entry| serde_json::from_str(&entry.body).expect("body should parse"))
            .collect();
        assert_eq!(decoded, input);
    }
}
