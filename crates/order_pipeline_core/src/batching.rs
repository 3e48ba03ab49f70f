use uuid::Uuid;

use crate::contract::{stable_contract_json, CanonicalOrder, PipelineError, QueueEntry, BATCH_SIZE};

/// One queue submission: the 1-indexed batch number and its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedBatch {
    pub batch_number: usize,
    pub entries: Vec<QueueEntry>,
}

pub fn batch_count(total: usize) -> usize {
    total.div_ceil(BATCH_SIZE)
}

pub fn queue_entry(order: &CanonicalOrder) -> Result<QueueEntry, PipelineError> {
    Ok(QueueEntry {
        entry_id: Uuid::new_v4().to_string(),
        order_id: order.id.clone(),
        body: stable_contract_json(order)?,
    })
}

/// Splits orders into consecutive batches of `BATCH_SIZE`; only the last may
/// be shorter. Every entry gets a fresh entry id.
pub fn plan_batches(orders: &[CanonicalOrder]) -> Result<Vec<PlannedBatch>, PipelineError> {
    orders
        .chunks(BATCH_SIZE)
        .enumerate()
        .map(|(index, chunk)| {
            Ok(PlannedBatch {
                batch_number: index + 1,
                entries: chunk.iter().map(queue_entry).collect::<Result<_, _>>()?,
            })
        })
        .collect()
}
