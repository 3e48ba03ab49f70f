use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::CanonicalOrder;
use crate::normalize::PRODUCT_SEPARATOR;

pub const PARTITION_KEY_ATTRIBUTE: &str = "pk";
pub const SORT_KEY_ATTRIBUTE: &str = "sk";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StorageKey {
    pub partition_key: String,
    pub sort_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoreAttribute {
    Text(String),
    /// Decimal number in its textual form.
    Number(String),
}

/// Single-item write addressed by a storage key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreItem {
    pub key: StorageKey,
    pub attributes: BTreeMap<String, StoreAttribute>,
}

pub fn partition_key(email: &str, shard_id: u32) -> String {
    format!("{email}#{shard_id}")
}

pub fn sort_key(date: &str, order_id: &str) -> String {
    format!("{date}#{order_id}")
}

pub fn order_item(order: &CanonicalOrder, key: StorageKey) -> StoreItem {
    let separator = PRODUCT_SEPARATOR.to_string();
    let attributes = BTreeMap::from([
        ("Email".to_string(), StoreAttribute::Text(order.email.clone())),
        (
            "Price".to_string(),
            StoreAttribute::Number(order.price.to_string()),
        ),
        (
            "Products".to_string(),
            StoreAttribute::Text(order.products.join(&separator)),
        ),
        ("Date".to_string(), StoreAttribute::Text(order.date.clone())),
    ]);

    StoreItem { key, attributes }
}
