use async_trait::async_trait;
use order_pipeline_core::storage_keys::StoreItem;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn put_item(&self, item: StoreItem) -> Result<(), String>;
}
