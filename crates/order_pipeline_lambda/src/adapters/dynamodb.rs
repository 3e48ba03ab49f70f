use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use order_pipeline_core::storage_keys::{
    StoreAttribute, StoreItem, PARTITION_KEY_ATTRIBUTE, SORT_KEY_ATTRIBUTE,
};

use crate::adapters::order_store::OrderStore;

#[derive(Debug, Clone)]
pub struct DynamoOrderStore {
    table_name: String,
    client: aws_sdk_dynamodb::Client,
}

impl DynamoOrderStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            client,
        }
    }
}

#[async_trait]
impl OrderStore for DynamoOrderStore {
    async fn put_item(&self, item: StoreItem) -> Result<(), String> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item(
                PARTITION_KEY_ATTRIBUTE,
                AttributeValue::S(item.key.partition_key),
            )
            .item(SORT_KEY_ATTRIBUTE, AttributeValue::S(item.key.sort_key));

        for (name, value) in item.attributes {
            request = request.item(name, attribute_value(value));
        }

        request
            .send()
            .await
            .map(|_| ())
            .map_err(|error| format!("failed to write order to dynamodb: {error}"))
    }
}

fn attribute_value(value: StoreAttribute) -> AttributeValue {
    match value {
        StoreAttribute::Text(text) => AttributeValue::S(text),
        StoreAttribute::Number(number) => AttributeValue::N(number),
    }
}
