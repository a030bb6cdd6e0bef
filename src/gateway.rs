use std::sync::Arc;

use eyre::WrapErr;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::catalog::{OperationDescriptor, REGION_PARAM};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::kinesis::{ClientFactory, KinesisBackend, SdkClientFactory};
use crate::middleware::{default_chain, Call, Middleware, Next};
use crate::operations::OPERATIONS;

/// Everything a handler needs for one call.
pub struct Invocation {
    pub arguments: Map<String, Value>,
    pub region: String,
    factory: Arc<dyn ClientFactory>,
}

impl Invocation {
    pub fn new(arguments: Map<String, Value>, region: String, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            arguments,
            region,
            factory,
        }
    }

    /// A fresh client bound to the resolved region.
    pub async fn client(&self) -> eyre::Result<Box<dyn KinesisBackend>> {
        self.factory
            .client(&self.region)
            .await
            .wrap_err_with(|| format!("Unable to create Kinesis client for region {}", self.region))
    }

    /// Deserializes the tool arguments, without `region_name` and with `null`
    /// members treated as absent.
    pub fn params<T: DeserializeOwned>(&self) -> eyre::Result<T> {
        let arguments: Map<String, Value> = self
            .arguments
            .iter()
            .filter(|(key, value)| key.as_str() != REGION_PARAM.name && !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        serde_json::from_value(Value::Object(arguments)).wrap_err("Invalid arguments")
    }
}

struct GatewayInner {
    config: GatewayConfig,
    factory: Arc<dyn ClientFactory>,
    chain: Vec<Arc<dyn Middleware>>,
}

/// Entry point for tool calls. Cheap to clone; holds no mutable state.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, factory: Arc<dyn ClientFactory>) -> Self {
        let chain = default_chain(config.read_only);
        Self::with_chain(config, factory, chain)
    }

    pub fn with_chain(
        config: GatewayConfig,
        factory: Arc<dyn ClientFactory>,
        chain: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                config,
                factory,
                chain,
            }),
        }
    }

    /// Gateway backed by the AWS SDK and configured from the environment.
    pub fn from_env() -> Self {
        Self::new(GatewayConfig::from_env(), Arc::new(SdkClientFactory))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn operations(&self) -> &'static [OperationDescriptor] {
        OPERATIONS
    }

    pub fn operation(&self, name: &str) -> Option<&'static OperationDescriptor> {
        OPERATIONS.iter().find(|operation| operation.name == name)
    }

    pub fn tool_definitions(&self) -> Vec<Value> {
        OPERATIONS
            .iter()
            .map(OperationDescriptor::tool_definition)
            .collect()
    }

    /// Runs a tool by name. `None` when no such tool exists.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Option<Value> {
        let operation = self.operation(name)?;
        Some(self.invoke(operation, arguments).await)
    }

    /// Runs one operation through the middleware chain. Always yields either
    /// the normalized result or an `{"error": ...}` envelope.
    pub async fn invoke(&self, operation: &'static OperationDescriptor, arguments: Value) -> Value {
        match self.try_invoke(operation, arguments).await {
            Ok(value) => value,
            Err(e) => e.into_envelope(),
        }
    }

    async fn try_invoke(
        &self,
        operation: &'static OperationDescriptor,
        arguments: Value,
    ) -> Result<Value, GatewayError> {
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(GatewayError::invalid("arguments", "expected an object")),
        };
        let explicit_region = arguments.get(REGION_PARAM.name).and_then(Value::as_str);
        let region = self.inner.config.resolve_region(explicit_region);
        let invocation = Invocation::new(arguments, region, Arc::clone(&self.inner.factory));
        let call = Call {
            operation,
            invocation,
        };
        Next::new(&self.inner.chain).run(call).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::{DEFAULT_REGION, READ_ONLY_ENV_VAR, REGION_ENV_VAR};
    use crate::kinesis::mock::MockFactory;
    use crate::kinesis::model::KinesisRequest;

    fn gateway(factory: &MockFactory, config: GatewayConfig) -> Gateway {
        factory.gateway(config)
    }

    fn read_only() -> GatewayConfig {
        GatewayConfig::from_lookup(|key| (key == READ_ONLY_ENV_VAR).then(|| "true".to_string()))
    }

    /// Minimal well-formed arguments for each tool.
    fn sample_arguments(name: &str) -> Value {
        match name {
            "create_stream" | "delete_stream" | "describe_stream" | "describe_stream_summary" => {
                json!({"stream_name": "orders"})
            }
            "update_shard_count" => json!({"stream_name": "orders", "target_shard_count": 2}),
            "update_stream_mode" => json!({
                "stream_arn": "arn:aws:kinesis:us-west-2:123456789012:stream/orders",
                "stream_mode_details": {"StreamMode": "ON_DEMAND"}
            }),
            "put_record" => json!({"data": "hello", "partition_key": "pk1", "stream_name": "orders"}),
            "put_records" => json!({"records": [{"Data": "hello", "PartitionKey": "pk1"}]}),
            "get_shard_iterator" => {
                json!({"shard_id": "shardId-000000000000", "shard_iterator_type": "LATEST"})
            }
            "get_records" => json!({"shard_iterator": "AAAA"}),
            "merge_shards" => json!({
                "shard_to_merge": "shardId-000000000000",
                "adjacent_shard_to_merge": "shardId-000000000001"
            }),
            "split_shard" => json!({"shard_to_split": "shardId-000000000000", "new_starting_hash_key": "1"}),
            "enable_enhanced_monitoring" | "disable_enhanced_monitoring" => {
                json!({"shard_level_metrics": ["ALL"], "stream_name": "orders"})
            }
            "start_stream_encryption" | "stop_stream_encryption" => json!({"key_id": "alias/aws/kinesis"}),
            "add_tags_to_stream" => json!({"tags": {"team": "data"}}),
            "remove_tags_from_stream" => json!({"tag_keys": ["team"]}),
            "increase_stream_retention_period" | "decrease_stream_retention_period" => {
                json!({"retention_period_hours": 48})
            }
            "register_stream_consumer" => json!({
                "stream_arn": "arn:aws:kinesis:us-west-2:123456789012:stream/orders",
                "consumer_name": "reader"
            }),
            "list_stream_consumers" => {
                json!({"stream_arn": "arn:aws:kinesis:us-west-2:123456789012:stream/orders"})
            }
            _ => json!({}),
        }
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let factory = MockFactory::default();
        let gateway = gateway(&factory, GatewayConfig::default());
        let mut names: Vec<_> = gateway.operations().iter().map(|op| op.name).collect();
        assert_eq!(names.len(), 27);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 27);
        assert_eq!(gateway.tool_definitions().len(), 27);
    }

    #[tokio::test]
    async fn test_every_operation_accepts_sample_arguments() {
        let env = GatewayConfig::from_lookup(|key| (key == REGION_ENV_VAR).then(|| "ap-southeast-2".to_string()));
        for operation in OPERATIONS {
            let factory = MockFactory::responding(json!({}));
            let gateway = gateway(&factory, env.clone());

            let mut arguments = sample_arguments(operation.name);
            arguments
                .as_object_mut()
                .unwrap()
                .insert("region_name".to_string(), json!("eu-central-1"));
            let result = gateway.invoke(operation, arguments).await;
            assert!(result.get("error").is_none(), "{}: {result}", operation.name);

            let result = gateway.invoke(operation, sample_arguments(operation.name)).await;
            assert!(result.get("error").is_none(), "{}: {result}", operation.name);

            assert_eq!(factory.call_count(), 2, "{}", operation.name);
            assert_eq!(factory.regions(), vec!["eu-central-1", "ap-southeast-2"], "{}", operation.name);
        }
    }

    #[tokio::test]
    async fn test_read_only_blocks_every_mutating_operation() {
        let mut blocked = 0;
        for operation in OPERATIONS {
            let factory = MockFactory::responding(json!({}));
            let gateway = gateway(&factory, read_only());
            let result = gateway.invoke(operation, sample_arguments(operation.name)).await;
            if operation.mutating {
                blocked += 1;
                assert_eq!(
                    result,
                    json!({"error": "Mutation not allowed: KINESIS-MCP-READONLY is set to true."})
                );
                assert_eq!(factory.call_count(), 0, "{}", operation.name);
                assert!(factory.regions().is_empty(), "{}", operation.name);
            } else {
                assert!(result.get("error").is_none(), "{}: {result}", operation.name);
                assert_eq!(factory.call_count(), 1, "{}", operation.name);
            }
        }
        assert_eq!(blocked, 18);
    }

    #[tokio::test]
    async fn test_region_resolution() {
        let factory = MockFactory::responding(json!({}));
        let env = GatewayConfig::from_lookup(|key| (key == REGION_ENV_VAR).then(|| "eu-west-1".to_string()));

        gateway(&factory, env.clone())
            .call_tool("list_streams", json!({"region_name": "us-east-1"}))
            .await
            .unwrap();
        gateway(&factory, env).call_tool("list_streams", json!({})).await.unwrap();
        gateway(&factory, GatewayConfig::default())
            .call_tool("list_streams", Value::Null)
            .await
            .unwrap();

        assert_eq!(factory.regions(), vec!["us-east-1", "eu-west-1", DEFAULT_REGION]);
        assert!(factory
            .requests()
            .iter()
            .all(|request| matches!(request, KinesisRequest::ListStreams(input) if input.limit.is_none())));
    }

    #[tokio::test]
    async fn test_backend_failure_becomes_envelope() {
        let factory = MockFactory::failing(
            "An error occurred (ResourceNotFoundException) when calling the DescribeStream operation: Stream orders not found",
        );
        let gateway = gateway(&factory, GatewayConfig::default());
        let result = gateway
            .call_tool("describe_stream", json!({"stream_name": "orders"}))
            .await
            .unwrap();
        assert_eq!(
            result,
            json!({"error": "An error occurred (ResourceNotFoundException) when calling the DescribeStream operation: Stream orders not found"})
        );
    }

    #[tokio::test]
    async fn test_invalid_arguments_make_no_call() {
        let factory = MockFactory::responding(json!({}));
        let gateway = gateway(&factory, GatewayConfig::default());

        let result = gateway
            .call_tool("increase_stream_retention_period", json!({"retention_period_hours": 8761}))
            .await
            .unwrap();
        assert_eq!(
            result,
            json!({"error": "Invalid argument 'retention_period_hours': must be at most 8760"})
        );

        let result = gateway
            .call_tool("list_streams", json!({"stream": "orders"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"error": "Invalid argument 'stream': unknown argument"}));

        let result = gateway.call_tool("list_streams", json!(["orders"])).await.unwrap();
        assert_eq!(result, json!({"error": "Invalid argument 'arguments': expected an object"}));

        assert_eq!(factory.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let factory = MockFactory::default();
        let gateway = gateway(&factory, GatewayConfig::default());
        assert!(gateway.call_tool("subscribe_to_shard", json!({})).await.is_none());
    }

    #[tokio::test]
    async fn test_custom_chain_without_guard() {
        let factory = MockFactory::responding(json!({}));
        let gateway = Gateway::with_chain(read_only(), Arc::new(factory.clone()), Vec::new());
        let result = gateway
            .call_tool("create_stream", json!({"stream_name": "orders"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"StreamName": "orders", "Status": "CREATING"}));
        assert_eq!(factory.call_count(), 1);
    }
}
