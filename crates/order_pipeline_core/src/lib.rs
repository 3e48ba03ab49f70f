//! Shared order pipeline domain primitives.
//!
//! This crate owns deterministic pipeline behavior: row normalization, queue
//! batch planning, shard-aware storage keys and configuration. It intentionally
//! excludes AWS SDK and Lambda runtime concerns, which live in
//! `order_pipeline_lambda`.

pub mod batching;
pub mod config;
pub mod contract;
pub mod normalize;
pub mod sharding;
pub mod storage_keys;
