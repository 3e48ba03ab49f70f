use std::num::NonZeroU32;

use crate::contract::{PipelineError, DEFAULT_TABLE_NAME};
use crate::sharding::default_shard_count;

pub const QUEUE_URL_VAR: &str = "QUEUE_URL";
pub const LEGACY_QUEUE_URL_VAR: &str = "SQS_QUEUE_URL";
pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const SHARD_COUNT_VAR: &str = "SHARD_COUNT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub queue_url: Option<String>,
    pub table_name: String,
    pub shard_count: NonZeroU32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_url: None,
            table_name: DEFAULT_TABLE_NAME.to_string(),
            shard_count: default_shard_count(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipelineError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let shard_count = match read(SHARD_COUNT_VAR) {
            Some(value) => parse_shard_count(&value)?,
            None => default_shard_count(),
        };

        Ok(Self {
            queue_url: read(QUEUE_URL_VAR).or_else(|| read(LEGACY_QUEUE_URL_VAR)),
            table_name: read(TABLE_NAME_VAR).unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            shard_count,
        })
    }

    pub fn require_queue_url(&self) -> Result<&str, PipelineError> {
        self.queue_url.as_deref().ok_or_else(|| {
            PipelineError::Configuration(format!("{QUEUE_URL_VAR} must be configured"))
        })
    }
}

fn parse_shard_count(value: &str) -> Result<NonZeroU32, PipelineError> {
    value.parse::<NonZeroU32>().map_err(|_| {
        PipelineError::Configuration(format!(
            "{SHARD_COUNT_VAR} must be a positive integer, got '{value}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup<'a>(vars: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| vars.get(name).map(|value| value.to_string())
    }

    #[test]
    fn applies_defaults_when_unset() {
        let vars = HashMap::new();
        let config = PipelineConfig::from_lookup(lookup(&vars)).expect("config should load");

        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.table_name, "Orders");
        assert_eq!(config.shard_count.get(), 5);
        assert!(config.require_queue_url().is_err());
    }

    #[test]
    fn reads_configured_values() {
        let vars = HashMap::from([
            ("QUEUE_URL", "https://sqs.example/orders"),
            ("TABLE_NAME", "OrdersV2"),
            ("SHARD_COUNT", "12"),
        ]);
        let config = PipelineConfig::from_lookup(lookup(&vars)).expect("config should load");

        assert_eq!(
            config.require_queue_url().expect("queue url"),
            "https://sqs.example/orders"
        );
        assert_eq!(config.table_name, "OrdersV2");
        assert_eq!(config.shard_count.get(), 12);
    }

    #[test]
    fn falls_back_to_legacy_queue_variable() {
        let vars = HashMap::from([("SQS_QUEUE_URL", "https://sqs.example/legacy")]);
        let config = PipelineConfig::from_lookup(lookup(&vars)).expect("config should load");

        assert_eq!(
            config.queue_url.as_deref(),
            Some("https://sqs.example/legacy")
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let vars = HashMap::from([("QUEUE_URL", "  "), ("TABLE_NAME", "")]);
        let config = PipelineConfig::from_lookup(lookup(&vars)).expect("config should load");

        assert_eq!(config.queue_url, None);
        assert_eq!(config.table_name, "Orders");
    }

    #[test]
    fn rejects_zero_or_non_numeric_shard_count() {
        for value in ["0", "-3", "five"] {
            let vars = HashMap::from([("SHARD_COUNT", value)]);
            let error = PipelineConfig::from_lookup(lookup(&vars))
                .expect_err("shard count should be rejected");
            assert!(matches!(error, PipelineError::Configuration(_)));
        }
    }
}
