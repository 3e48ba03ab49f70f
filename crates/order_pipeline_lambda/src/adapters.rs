//! Queue and store boundaries plus their AWS implementations.

pub mod dynamodb;
pub mod order_store;
pub mod queue;
pub mod sqs;
