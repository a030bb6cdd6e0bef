use eyre::Result;
use serde_json::{json, Value};

use super::{member, member_or, STREAM_ARN, STREAM_ARN_REQUIRED, STREAM_MODE_FIELDS, STREAM_NAME, STREAM_NAME_REQUIRED};
use crate::catalog::{ParamKind, ParamSpec};
use crate::gateway::Invocation;
use crate::kinesis::model::{
    CreateStreamInput, DeleteStreamInput, DescribeStreamInput, DescribeStreamSummaryInput, EncryptionType,
    ListStreamsInput, RetentionPeriodInput, StreamEncryptionInput, UpdateStreamModeInput,
};
use crate::kinesis::KinesisRequest;

pub(super) const CREATE_STREAM: &[ParamSpec] = &[
    STREAM_NAME_REQUIRED,
    ParamSpec::optional("shard_count", ParamKind::int_min(1), "Number of shards for PROVISIONED mode"),
    ParamSpec::optional(
        "stream_mode_details",
        ParamKind::Object(STREAM_MODE_FIELDS),
        "Stream mode configuration (PROVISIONED or ON_DEMAND)",
    ),
];

pub(super) const DELETE_STREAM: &[ParamSpec] = &[
    STREAM_NAME_REQUIRED,
    ParamSpec::optional(
        "enforce_consumer_deletion",
        ParamKind::Bool,
        "Delete the stream even if it has registered consumers",
    ),
];

pub(super) const DESCRIBE_STREAM: &[ParamSpec] = &[
    STREAM_NAME_REQUIRED,
    ParamSpec::optional("limit", ParamKind::int_range(1, 10000), "Maximum number of shards to return"),
    ParamSpec::optional(
        "exclusive_start_shard_id",
        ParamKind::Str,
        "Shard ID to start listing from (for pagination)",
    ),
    STREAM_ARN,
];

pub(super) const DESCRIBE_STREAM_SUMMARY: &[ParamSpec] = &[STREAM_NAME_REQUIRED, STREAM_ARN];

pub(super) const LIST_STREAMS: &[ParamSpec] = &[
    ParamSpec::optional("limit", ParamKind::int_range(1, 10000), "Maximum number of streams to return"),
    ParamSpec::optional(
        "exclusive_start_stream_name",
        ParamKind::Str,
        "Stream name to start listing from (for pagination)",
    ),
    super::NEXT_TOKEN,
];

pub(super) const UPDATE_STREAM_MODE: &[ParamSpec] = &[
    STREAM_ARN_REQUIRED,
    ParamSpec::required(
        "stream_mode_details",
        ParamKind::Object(STREAM_MODE_FIELDS),
        "The mode to switch the stream to (PROVISIONED or ON_DEMAND)",
    ),
];

pub(super) const RETENTION_PERIOD: &[ParamSpec] = &[
    ParamSpec::required(
        "retention_period_hours",
        ParamKind::int_range(24, 8760),
        "New retention period in hours (24-8760)",
    ),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) const START_STREAM_ENCRYPTION: &[ParamSpec] = &[
    ParamSpec::optional("encryption_type", ParamKind::Enum(EncryptionType::VALUES), "The encryption type to use")
        .with_default("KMS"),
    ParamSpec::required("key_id", ParamKind::Str, "The GUID or alias of the AWS KMS key"),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) const STOP_STREAM_ENCRYPTION: &[ParamSpec] = &[
    ParamSpec::optional("encryption_type", ParamKind::Enum(EncryptionType::VALUES), "The encryption type to disable")
        .with_default("KMS"),
    ParamSpec::required("key_id", ParamKind::Str, "The GUID or alias of the AWS KMS key"),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) async fn create_stream(invocation: Invocation) -> Result<Value> {
    let input: CreateStreamInput = invocation.params()?;
    let client = invocation.client().await?;
    let stream_name = input.stream_name.clone();
    client.call(KinesisRequest::CreateStream(input)).await?;
    Ok(json!({"StreamName": stream_name, "Status": "CREATING"}))
}

pub(super) async fn delete_stream(invocation: Invocation) -> Result<Value> {
    let input: DeleteStreamInput = invocation.params()?;
    let client = invocation.client().await?;
    let stream_name = input.stream_name.clone();
    client.call(KinesisRequest::DeleteStream(input)).await?;
    Ok(json!({"StreamName": stream_name, "Status": "DELETING"}))
}

pub(super) async fn describe_stream(invocation: Invocation) -> Result<Value> {
    let input: DescribeStreamInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::DescribeStream(input)).await?;
    Ok(member_or(&response, "StreamDescription", json!({})))
}

pub(super) async fn describe_stream_summary(invocation: Invocation) -> Result<Value> {
    let input: DescribeStreamSummaryInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::DescribeStreamSummary(input)).await?;
    Ok(member_or(&response, "StreamDescriptionSummary", json!({})))
}

pub(super) async fn list_streams(invocation: Invocation) -> Result<Value> {
    let input: ListStreamsInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::ListStreams(input)).await?;
    Ok(json!({
        "StreamNames": member_or(&response, "StreamNames", json!([])),
        "HasMoreStreams": member_or(&response, "HasMoreStreams", json!(false)),
        "NextToken": member(&response, "NextToken"),
        "StreamSummaries": member_or(&response, "StreamSummaries", json!([])),
    }))
}

pub(super) async fn update_stream_mode(invocation: Invocation) -> Result<Value> {
    let input: UpdateStreamModeInput = invocation.params()?;
    let client = invocation.client().await?;
    let echo = json!({
        "StreamARN": &input.stream_arn,
        "StreamModeDetails": &input.stream_mode_details,
    });
    client.call(KinesisRequest::UpdateStreamMode(input)).await?;
    Ok(echo)
}

pub(super) async fn increase_stream_retention_period(invocation: Invocation) -> Result<Value> {
    let input: RetentionPeriodInput = invocation.params()?;
    let client = invocation.client().await?;
    client.call(KinesisRequest::IncreaseStreamRetentionPeriod(input)).await?;
    Ok(json!({"Status": "Retention period increased"}))
}

pub(super) async fn decrease_stream_retention_period(invocation: Invocation) -> Result<Value> {
    let input: RetentionPeriodInput = invocation.params()?;
    let client = invocation.client().await?;
    client.call(KinesisRequest::DecreaseStreamRetentionPeriod(input)).await?;
    Ok(json!({"Status": "Retention period decreased"}))
}

pub(super) async fn start_stream_encryption(invocation: Invocation) -> Result<Value> {
    let input: StreamEncryptionInput = invocation.params()?;
    let client = invocation.client().await?;
    client.call(KinesisRequest::StartStreamEncryption(input)).await?;
    Ok(json!({"Status": "Encryption started"}))
}

pub(super) async fn stop_stream_encryption(invocation: Invocation) -> Result<Value> {
    let input: StreamEncryptionInput = invocation.params()?;
    let client = invocation.client().await?;
    client.call(KinesisRequest::StopStreamEncryption(input)).await?;
    Ok(json!({"Status": "Encryption stopped"}))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::GatewayConfig;
    use crate::kinesis::mock::MockFactory;
    use crate::kinesis::model::*;
    use crate::kinesis::KinesisRequest;

    #[tokio::test]
    async fn test_create_stream_orders() {
        let factory = MockFactory::responding(json!({}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("create_stream", json!({"stream_name": "orders", "shard_count": 4}))
            .await
            .unwrap();

        assert_eq!(result, json!({"StreamName": "orders", "Status": "CREATING"}));
        assert_eq!(
            factory.last_request(),
            KinesisRequest::CreateStream(CreateStreamInput {
                stream_name: "orders".into(),
                shard_count: Some(4),
                stream_mode_details: None,
            })
        );
    }

    #[tokio::test]
    async fn test_create_on_demand_stream() {
        let factory = MockFactory::responding(json!({}));
        factory
            .gateway(GatewayConfig::default())
            .call_tool(
                "create_stream",
                json!({"stream_name": "clicks", "stream_mode_details": {"StreamMode": "ON_DEMAND"}}),
            )
            .await
            .unwrap();

        let KinesisRequest::CreateStream(input) = factory.last_request() else {
            panic!("unexpected request");
        };
        assert_eq!(input.shard_count, None);
        assert_eq!(
            input.stream_mode_details,
            Some(StreamModeDetails {
                stream_mode: StreamMode::OnDemand
            })
        );
    }

    #[tokio::test]
    async fn test_create_stream_rejects_zero_shards() {
        let factory = MockFactory::responding(json!({}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("create_stream", json!({"stream_name": "orders", "shard_count": 0}))
            .await
            .unwrap();
        assert_eq!(result, json!({"error": "Invalid argument 'shard_count': must be at least 1"}));
        assert_eq!(factory.call_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_stream() {
        let factory = MockFactory::responding(json!({}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("delete_stream", json!({"stream_name": "orders", "enforce_consumer_deletion": true}))
            .await
            .unwrap();

        assert_eq!(result, json!({"StreamName": "orders", "Status": "DELETING"}));
        assert_eq!(
            factory.last_request(),
            KinesisRequest::DeleteStream(DeleteStreamInput {
                stream_name: "orders".into(),
                enforce_consumer_deletion: Some(true),
            })
        );
    }

    #[tokio::test]
    async fn test_describe_stream_unwraps_description() {
        let description = json!({
            "StreamName": "orders",
            "StreamStatus": "ACTIVE",
            "Shards": [{"ShardId": "shardId-000000000000"}],
            "HasMoreShards": false,
            "RetentionPeriodHours": 24
        });
        let factory = MockFactory::responding(json!({"StreamDescription": description.clone()}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("describe_stream", json!({"stream_name": "orders", "limit": 10}))
            .await
            .unwrap();

        assert_eq!(result, description);
        let KinesisRequest::DescribeStream(input) = factory.last_request() else {
            panic!("unexpected request");
        };
        assert_eq!(input.limit, Some(10));
        assert_eq!(input.exclusive_start_shard_id, None);
    }

    #[tokio::test]
    async fn test_describe_stream_summary() {
        let factory = MockFactory::responding(json!({
            "StreamDescriptionSummary": {"StreamName": "orders", "OpenShardCount": 2}
        }));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("describe_stream_summary", json!({"stream_name": "orders"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"StreamName": "orders", "OpenShardCount": 2}));
    }

    #[tokio::test]
    async fn test_list_streams_fills_defaults() {
        let factory = MockFactory::responding(json!({"StreamNames": ["orders"]}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool("list_streams", json!({"limit": 5}))
            .await
            .unwrap();

        assert_eq!(
            result,
            json!({
                "StreamNames": ["orders"],
                "HasMoreStreams": false,
                "NextToken": null,
                "StreamSummaries": []
            })
        );
    }

    #[tokio::test]
    async fn test_update_stream_mode_echoes_request() {
        let arn = "arn:aws:kinesis:us-west-2:123456789012:stream/orders";
        let factory = MockFactory::responding(json!({}));
        let result = factory
            .gateway(GatewayConfig::default())
            .call_tool(
                "update_stream_mode",
                json!({"stream_arn": arn, "stream_mode_details": {"StreamMode": "PROVISIONED"}}),
            )
            .await
            .unwrap();
        assert_eq!(
            result,
            json!({"StreamARN": arn, "StreamModeDetails": {"StreamMode": "PROVISIONED"}})
        );
    }

    #[tokio::test]
    async fn test_retention_period_bounds() {
        let factory = MockFactory::responding(json!({}));
        let gateway = factory.gateway(GatewayConfig::default());

        for hours in [23, 8761] {
            let result = gateway
                .call_tool("decrease_stream_retention_period", json!({"retention_period_hours": hours, "stream_name": "orders"}))
                .await
                .unwrap();
            assert!(result["error"].as_str().unwrap().contains("retention_period_hours"));
        }
        assert_eq!(factory.call_count(), 0);

        let result = gateway
            .call_tool("increase_stream_retention_period", json!({"retention_period_hours": 168, "stream_name": "orders"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"Status": "Retention period increased"}));
        assert_eq!(
            factory.last_request(),
            KinesisRequest::IncreaseStreamRetentionPeriod(RetentionPeriodInput {
                retention_period_hours: 168,
                stream_name: Some("orders".into()),
                stream_arn: None,
            })
        );
    }

    #[tokio::test]
    async fn test_stream_encryption_defaults_to_kms() {
        let factory = MockFactory::responding(json!({}));
        let gateway = factory.gateway(GatewayConfig::default());

        let started = gateway
            .call_tool("start_stream_encryption", json!({"key_id": "alias/aws/kinesis", "stream_name": "orders"}))
            .await
            .unwrap();
        assert_eq!(started, json!({"Status": "Encryption started"}));

        let stopped = gateway
            .call_tool("stop_stream_encryption", json!({"key_id": "alias/aws/kinesis", "stream_name": "orders"}))
            .await
            .unwrap();
        assert_eq!(stopped, json!({"Status": "Encryption stopped"}));

        let KinesisRequest::StopStreamEncryption(input) = factory.last_request() else {
            panic!("unexpected request");
        };
        assert_eq!(input.encryption_type, EncryptionType::Kms);
        assert_eq!(input.key_id, "alias/aws/kinesis");
    }
}
