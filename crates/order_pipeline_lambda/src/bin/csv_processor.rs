use lambda_runtime::{service_fn, Error, LambdaEvent};
use order_pipeline_lambda::adapters::sqs::SqsOrderQueue;
use order_pipeline_lambda::handlers::upload::{handle_upload_event, ApiGatewayResponse};
use order_pipeline_lambda::logging::init_logging;
use order_pipeline_lambda::runtime::config::PipelineConfig;
use serde_json::Value;

async fn handle_request(
    event: LambdaEvent<Value>,
    queue: &SqsOrderQueue,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_upload_event(event.payload, queue).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let config = PipelineConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    let queue_url = config
        .require_queue_url()
        .map_err(|error| Error::from(error.to_string()))?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let queue = SqsOrderQueue::new(aws_sdk_sqs::Client::new(&aws_config), queue_url);
    let queue = &queue;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, queue).await
    }))
    .await
}
