use async_trait::async_trait;
use order_pipeline_core::contract::{BatchResult, QueueEntry};

/// Destination for batched order messages.
///
/// `send_batch` fails only when the whole submission failed; entries the
/// queue rejected individually are reported in the `BatchResult`.
#[async_trait]
pub trait OrderQueue: Send + Sync {
    async fn send_batch(&self, entries: &[QueueEntry]) -> Result<BatchResult, String>;
}
