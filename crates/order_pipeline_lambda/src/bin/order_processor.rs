use lambda_runtime::{service_fn, Error, LambdaEvent};
use order_pipeline_lambda::adapters::dynamodb::DynamoOrderStore;
use order_pipeline_lambda::handlers::consumer::handle_queue_event;
use order_pipeline_lambda::logging::init_logging;
use order_pipeline_lambda::runtime::config::PipelineConfig;
use order_pipeline_lambda::runtime::contract::PartialFailureReport;
use order_pipeline_lambda::runtime::sharding::KeyDeriver;
use serde_json::Value;

async fn handle_request(
    event: LambdaEvent<Value>,
    store: &DynamoOrderStore,
    key_deriver: KeyDeriver,
) -> Result<PartialFailureReport, Error> {
    Ok(handle_queue_event(&event.payload, store, key_deriver).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = PipelineConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    let key_deriver = KeyDeriver::new(config.shard_count);

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoOrderStore::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        config.table_name,
    );
    let store = &store;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, store, key_deriver).await
    }))
    .await
}
