use eyre::Result;
use serde_json::{json, Value};

use super::{member, member_or, NEXT_TOKEN, STREAM_ARN, STREAM_ARN_REQUIRED, STREAM_CREATION_TIMESTAMP};
use crate::catalog::{ParamKind, ParamSpec};
use crate::gateway::Invocation;
use crate::kinesis::model::{ConsumerLookupInput, ListStreamConsumersInput, RegisterStreamConsumerInput};
use crate::kinesis::KinesisRequest;

pub(super) const REGISTER_STREAM_CONSUMER: &[ParamSpec] = &[
    STREAM_ARN_REQUIRED,
    ParamSpec::required("consumer_name", ParamKind::Str, "Name of the consumer, unique per stream"),
];

/// A consumer is named either by stream ARN and consumer name or by its own ARN.
pub(super) const CONSUMER_LOOKUP: &[ParamSpec] = &[
    STREAM_ARN,
    ParamSpec::optional("consumer_name", ParamKind::Str, "The name of the consumer"),
    ParamSpec::optional("consumer_arn", ParamKind::Str, "The ARN of the consumer"),
];

pub(super) const LIST_STREAM_CONSUMERS: &[ParamSpec] = &[
    STREAM_ARN_REQUIRED,
    NEXT_TOKEN,
    ParamSpec::optional("max_results", ParamKind::int_range(1, 10000), "Maximum number of consumers to return"),
    STREAM_CREATION_TIMESTAMP,
];

pub(super) async fn register_stream_consumer(invocation: Invocation) -> Result<Value> {
    let input: RegisterStreamConsumerInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::RegisterStreamConsumer(input)).await?;
    Ok(member_or(&response, "Consumer", json!({})))
}

pub(super) async fn deregister_stream_consumer(invocation: Invocation) -> Result<Value> {
    let input: ConsumerLookupInput = invocation.params()?;
    let client = invocation.client().await?;
    client.call(KinesisRequest::DeregisterStreamConsumer(input)).await?;
    Ok(json!({"Status": "Consumer deregistered"}))
}

pub(super) async fn describe_stream_consumer(invocation: Invocation) -> Result<Value> {
    let input: ConsumerLookupInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::DescribeStreamConsumer(input)).await?;
    Ok(member_or(&response, "ConsumerDescription", json!({})))
}

pub(super) async fn list_stream_consumers(invocation: Invocation) -> Result<Value> {
    let input: ListStreamConsumersInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::ListStreamConsumers(input)).await?;
    Ok(json!({
        "Consumers": member_or(&response, "Consumers", json!([])),
        "NextToken": member(&response, "NextToken"),
    }))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::GatewayConfig;
    use crate::kinesis::mock::MockFactory;
    use crate::kinesis::model::*;
    use crate::kinesis::KinesisRequest;

    const STREAM: &str = "arn:aws:kinesis:us-west-2:123456789012:stream/orders";
    const CONSUMER: &str = "arn:aws:kinesis:us-west-2:123456789012:stream/orders/consumer/reader:1700000000";

    #[tokio::test]
    async fn test_register_consumer_returns_descriptor() {
        let consumer = json!({
            "ConsumerName": "reader",
            "ConsumerARN": CONSUMER,
            "ConsumerStatus": "CREATING",
            "ConsumerCreationTimestamp": "2023-11-14T22:13:20Z"
        });
        let factory = MockFactory::responding(json!({"Consumer": consumer.clone()}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("register_stream_consumer", json!({"stream_arn": STREAM, "consumer_name": "reader"}))
            .await
            .unwrap();

        assert_eq!(result, consumer);
        assert_eq!(
            factory.last_request(),
            KinesisRequest::RegisterStreamConsumer(RegisterStreamConsumerInput {
                stream_arn: STREAM.into(),
                consumer_name: "reader".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_register_consumer_requires_name() {
        let factory = MockFactory::responding(json!({}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("register_stream_consumer", json!({"stream_arn": STREAM}))
            .await
            .unwrap();
        assert_eq!(result, json!({"error": "Invalid argument 'consumer_name': is required"}));
        assert_eq!(factory.call_count(), 0);
    }

    #[tokio::test]
    async fn test_deregister_by_consumer_arn() {
        let factory = MockFactory::responding(json!({}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("deregister_stream_consumer", json!({"consumer_arn": CONSUMER}))
            .await
            .unwrap();
        assert_eq!(result, json!({"Status": "Consumer deregistered"}));
        assert_eq!(
            factory.last_request(),
            KinesisRequest::DeregisterStreamConsumer(ConsumerLookupInput {
                consumer_arn: Some(CONSUMER.into()),
                ..Default::default()
            })
        );
    }

    #[tokio::test]
    async fn test_describe_consumer_missing_description() {
        let factory = MockFactory::responding(json!({}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool(
                "describe_stream_consumer",
                json!({"stream_arn": STREAM, "consumer_name": "reader"}),
            )
            .await
            .unwrap();
        assert_eq!(result, json!({}));
    }

    #[tokio::test]
    async fn test_list_consumers() {
        let factory = MockFactory::responding(json!({
            "Consumers": [{"ConsumerName": "reader", "ConsumerARN": CONSUMER}],
            "NextToken": "page-2"
        }));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("list_stream_consumers", json!({"stream_arn": STREAM, "max_results": 1}))
            .await
            .unwrap();
        assert_eq!(
            result,
            json!({
                "Consumers": [{"ConsumerName": "reader", "ConsumerARN": CONSUMER}],
                "NextToken": "page-2"
            })
        );
        let KinesisRequest::ListStreamConsumers(input) = factory.last_request() else {
            panic!("unexpected request");
        };
        assert_eq!(input.max_results, Some(1));
    }
}
