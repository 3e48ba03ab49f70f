use std::num::NonZeroU32;

use sha2::{Digest, Sha256};

use crate::contract::{CanonicalOrder, PipelineError, DEFAULT_SHARD_COUNT};
use crate::storage_keys::{partition_key, sort_key, StorageKey};

/// Hex digits of the digest used as the shard seed (32 bits).
const HASH_PREFIX_LEN: usize = 8;

pub fn default_shard_count() -> NonZeroU32 {
    NonZeroU32::new(DEFAULT_SHARD_COUNT).unwrap_or(NonZeroU32::MIN)
}

/// Maps an order id onto a 1-indexed shard in `[1, shard_count]`.
pub fn shard_id_for(order_id: &str, shard_count: NonZeroU32) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(order_id.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    // A sha256 hex digest is always 64 lowercase hex digits.
    let seed = u32::from_str_radix(&digest[..HASH_PREFIX_LEN], 16).unwrap_or_default();
    seed % shard_count.get() + 1
}

/// Derives storage keys for orders under a fixed shard count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDeriver {
    shard_count: NonZeroU32,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(default_shard_count())
    }
}

impl KeyDeriver {
    pub fn new(shard_count: NonZeroU32) -> Self {
        Self { shard_count }
    }

    pub fn shard_count(&self) -> NonZeroU32 {
        self.shard_count
    }

    pub fn derive(&self, order: &CanonicalOrder) -> Result<StorageKey, PipelineError> {
        for (field, value) in [
            ("id", &order.id),
            ("email", &order.email),
            ("date", &order.date),
        ] {
            if value.is_empty() {
                return Err(PipelineError::InvalidStorageKey(format!(
                    "order {field} must not be empty"
                )));
            }
        }

        let shard_id = shard_id_for(&order.id, self.shard_count);
        Ok(StorageKey {
            partition_key: partition_key(&order.email, shard_id),
            sort_key: sort_key(&order.date, &order.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str) -> CanonicalOrder {
        CanonicalOrder {
            id: id.to_string(),
            email: "a@b.com".to_string(),
            price: 10.0,
            products: vec!["x".to_string()],
            date: "2024-01-01".to_string(),
        }
    }

    fn shards(count: u32) -> NonZeroU32 {
        NonZeroU32::new(count).expect("shard count should be positive")
    }

    #[test]
    fn derive_is_deterministic_for_identical_input() {
        let deriver = KeyDeriver::default();
        let first = deriver.derive(&order("order-1")).expect("key should derive");
        let second = deriver.derive(&order("order-1")).expect("key should derive");

        assert_eq!(first, second);
    }

    #[test]
    fn shard_id_matches_sha256_prefix() {
        // sha256("abc") starts with ba7816bf; 0xba7816bf % 5 + 1 == 5
        assert_eq!(shard_id_for("abc", shards(5)), 5);
    }

    #[test]
    fn shard_id_stays_in_range_for_every_shard_count() {
        for count in 1..=32 {
            for index in 0..200 {
                let shard = shard_id_for(&format!("order-{index}"), shards(count));
                assert!((1..=count).contains(&shard), "shard {shard} for count {count}");
            }
        }
    }

    #[test]
    fn single_shard_always_maps_to_one() {
        for index in 0..50 {
            assert_eq!(shard_id_for(&format!("id-{index}"), shards(1)), 1);
        }
    }

    #[test]
    fn ids_spread_across_all_shards() {
        let count = 5;
        let mut hits = [0usize; 5];
        for index in 0..5_000 {
            let shard = shard_id_for(&format!("order-{index}"), shards(count));
            hits[(shard - 1) as usize] += 1;
        }

        for (shard, total) in hits.iter().enumerate() {
            assert!(
                (800..=1_200).contains(total),
                "shard {} received {total} of 5000 ids",
                shard + 1
            );
        }
    }

    #[test]
    fn derive_formats_partition_and_sort_keys() {
        let deriver = KeyDeriver::new(shards(5));
        let key = deriver.derive(&order("abc")).expect("key should derive");

        assert_eq!(key.partition_key, "a@b.com#5");
        assert_eq!(key.sort_key, "2024-01-01#abc");
    }

    #[test]
    fn derive_rejects_missing_email() {
        let mut incomplete = order("abc");
        incomplete.email.clear();

        let error = KeyDeriver::default()
            .derive(&incomplete)
            .expect_err("empty email should fail");
        assert!(matches!(error, PipelineError::InvalidStorageKey(_)));
    }
}
