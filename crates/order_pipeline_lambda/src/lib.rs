//! AWS-oriented adapters and handlers for the order ingestion pipeline.
//!
//! This crate owns runtime integration details (Lambda handlers, SQS batch
//! publishing, DynamoDB writes, multipart upload decoding) and exposes a single
//! runtime module boundary for contract, normalization, sharding and storage
//! key primitives.

pub mod adapters;
pub mod dispatcher;
pub mod handlers;
pub mod logging;
pub mod multipart;
pub mod publisher;
pub mod runtime;
