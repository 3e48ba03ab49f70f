pub use order_pipeline_core::{batching, config, contract, normalize, sharding, storage_keys};
