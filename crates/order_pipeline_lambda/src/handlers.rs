pub mod consumer;
pub mod upload;
