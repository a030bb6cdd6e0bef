use std::fmt::Debug;

use async_trait::async_trait;
use aws_config::{AppName, BehaviorVersion, Region};
use aws_sdk_kinesis::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_kinesis::operation::create_stream::builders::CreateStreamFluentBuilder;
use aws_sdk_kinesis::operation::get_shard_iterator::builders::GetShardIteratorFluentBuilder;
use aws_sdk_kinesis::operation::list_shards::builders::ListShardsFluentBuilder;
use aws_sdk_kinesis::operation::put_record::builders::PutRecordFluentBuilder;
use aws_sdk_kinesis::operation::put_records::builders::PutRecordsFluentBuilder;
use aws_sdk_kinesis::primitives::{Blob, DateTime};
use aws_sdk_kinesis::types as sdk;
use aws_sdk_kinesis::Client;
use eyre::{eyre, Result, WrapErr};
use serde_json::{json, Value};

use super::json::{object, ToJson};
use super::model::{
    CreateStreamInput, GetShardIteratorInput, KinesisRequest, ListShardsInput, MetricsName, PutRecordInput,
    PutRecordsInput, ShardFilter, StreamModeDetails,
};
use super::{ClientFactory, KinesisBackend};

/// Application name appended to the SDK user agent.
const USER_AGENT_APP_NAME: &str = "MCP-KinesisServer";

/// Loads the default AWS configuration for every call, so rotated
/// credentials are picked up without restarting the server.
#[derive(Debug, Default, Clone)]
pub struct SdkClientFactory;

#[async_trait]
impl ClientFactory for SdkClientFactory {
    async fn client(&self, region: &str) -> Result<Box<dyn KinesisBackend>> {
        let app_name = AppName::new(USER_AGENT_APP_NAME).wrap_err("Invalid user agent app name")?;
        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .app_name(app_name)
            .load()
            .await;
        tracing::debug!(region, "Loaded AWS configuration");
        Ok(Box::new(SdkBackend {
            client: Client::new(&shared_config),
        }))
    }
}

pub struct SdkBackend {
    client: Client,
}

#[async_trait]
impl KinesisBackend for SdkBackend {
    async fn call(&self, request: KinesisRequest) -> Result<Value> {
        let client = &self.client;
        match request {
            KinesisRequest::CreateStream(input) => {
                create_stream_request(client, input)?
                    .send()
                    .await
                    .map_err(|e| service_error("CreateStream", e))?;
                Ok(json!({}))
            }
            KinesisRequest::DeleteStream(input) => {
                client
                    .delete_stream()
                    .stream_name(input.stream_name)
                    .set_enforce_consumer_deletion(input.enforce_consumer_deletion)
                    .send()
                    .await
                    .map_err(|e| service_error("DeleteStream", e))?;
                Ok(json!({}))
            }
            KinesisRequest::DescribeStream(input) => {
                let output = client
                    .describe_stream()
                    .stream_name(input.stream_name)
                    .set_limit(input.limit)
                    .set_exclusive_start_shard_id(input.exclusive_start_shard_id)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("DescribeStream", e))?;
                Ok(object([("StreamDescription", output.stream_description().to_json())]))
            }
            KinesisRequest::DescribeStreamSummary(input) => {
                let output = client
                    .describe_stream_summary()
                    .stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("DescribeStreamSummary", e))?;
                Ok(object([(
                    "StreamDescriptionSummary",
                    output.stream_description_summary().to_json(),
                )]))
            }
            KinesisRequest::ListStreams(input) => {
                let output = client
                    .list_streams()
                    .set_limit(input.limit)
                    .set_exclusive_start_stream_name(input.exclusive_start_stream_name)
                    .set_next_token(input.next_token)
                    .send()
                    .await
                    .map_err(|e| service_error("ListStreams", e))?;
                Ok(object([
                    ("StreamNames", output.stream_names().to_json()),
                    ("HasMoreStreams", output.has_more_streams().to_json()),
                    ("NextToken", output.next_token().to_json()),
                    ("StreamSummaries", output.stream_summaries().to_json()),
                ]))
            }
            KinesisRequest::ListShards(input) => {
                let output = list_shards_request(client, input)?
                    .send()
                    .await
                    .map_err(|e| service_error("ListShards", e))?;
                Ok(object([
                    ("Shards", output.shards().to_json()),
                    ("NextToken", output.next_token().to_json()),
                ]))
            }
            KinesisRequest::UpdateShardCount(input) => {
                let output = client
                    .update_shard_count()
                    .stream_name(input.stream_name)
                    .target_shard_count(input.target_shard_count)
                    .scaling_type(sdk::ScalingType::from(input.scaling_type.as_str()))
                    .send()
                    .await
                    .map_err(|e| service_error("UpdateShardCount", e))?;
                Ok(object([
                    ("StreamName", output.stream_name().to_json()),
                    ("CurrentShardCount", output.current_shard_count().to_json()),
                    ("TargetShardCount", output.target_shard_count().to_json()),
                    ("StreamARN", output.stream_arn().to_json()),
                ]))
            }
            KinesisRequest::UpdateStreamMode(input) => {
                client
                    .update_stream_mode()
                    .stream_arn(input.stream_arn)
                    .stream_mode_details(stream_mode_details(input.stream_mode_details)?)
                    .send()
                    .await
                    .map_err(|e| service_error("UpdateStreamMode", e))?;
                Ok(json!({}))
            }
            KinesisRequest::PutRecord(input) => {
                let output = put_record_request(client, input)
                    .send()
                    .await
                    .map_err(|e| service_error("PutRecord", e))?;
                Ok(object([
                    ("ShardId", output.shard_id().to_json()),
                    ("SequenceNumber", output.sequence_number().to_json()),
                    ("EncryptionType", output.encryption_type().to_json()),
                ]))
            }
            KinesisRequest::PutRecords(input) => {
                let output = put_records_request(client, input)?
                    .send()
                    .await
                    .map_err(|e| service_error("PutRecords", e))?;
                Ok(object([
                    ("FailedRecordCount", output.failed_record_count().to_json()),
                    ("Records", output.records().to_json()),
                    ("EncryptionType", output.encryption_type().to_json()),
                ]))
            }
            KinesisRequest::GetShardIterator(input) => {
                let output = get_shard_iterator_request(client, input)
                    .send()
                    .await
                    .map_err(|e| service_error("GetShardIterator", e))?;
                Ok(object([("ShardIterator", output.shard_iterator().to_json())]))
            }
            KinesisRequest::GetRecords(input) => {
                let output = client
                    .get_records()
                    .shard_iterator(input.shard_iterator)
                    .set_limit(input.limit)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("GetRecords", e))?;
                Ok(object([
                    ("Records", output.records().to_json()),
                    ("NextShardIterator", output.next_shard_iterator().to_json()),
                    ("MillisBehindLatest", output.millis_behind_latest().to_json()),
                ]))
            }
            KinesisRequest::MergeShards(input) => {
                client
                    .merge_shards()
                    .shard_to_merge(input.shard_to_merge)
                    .adjacent_shard_to_merge(input.adjacent_shard_to_merge)
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("MergeShards", e))?;
                Ok(json!({}))
            }
            KinesisRequest::SplitShard(input) => {
                client
                    .split_shard()
                    .shard_to_split(input.shard_to_split)
                    .new_starting_hash_key(input.new_starting_hash_key)
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("SplitShard", e))?;
                Ok(json!({}))
            }
            KinesisRequest::EnableEnhancedMonitoring(input) => {
                let output = client
                    .enable_enhanced_monitoring()
                    .set_shard_level_metrics(Some(metric_names(&input.shard_level_metrics)))
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("EnableEnhancedMonitoring", e))?;
                Ok(object([
                    ("StreamName", output.stream_name().to_json()),
                    ("CurrentShardLevelMetrics", output.current_shard_level_metrics().to_json()),
                    ("DesiredShardLevelMetrics", output.desired_shard_level_metrics().to_json()),
                    ("StreamARN", output.stream_arn().to_json()),
                ]))
            }
            KinesisRequest::DisableEnhancedMonitoring(input) => {
                let output = client
                    .disable_enhanced_monitoring()
                    .set_shard_level_metrics(Some(metric_names(&input.shard_level_metrics)))
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("DisableEnhancedMonitoring", e))?;
                Ok(object([
                    ("StreamName", output.stream_name().to_json()),
                    ("CurrentShardLevelMetrics", output.current_shard_level_metrics().to_json()),
                    ("DesiredShardLevelMetrics", output.desired_shard_level_metrics().to_json()),
                    ("StreamARN", output.stream_arn().to_json()),
                ]))
            }
            KinesisRequest::StartStreamEncryption(input) => {
                client
                    .start_stream_encryption()
                    .encryption_type(sdk::EncryptionType::from(input.encryption_type.as_str()))
                    .key_id(input.key_id)
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("StartStreamEncryption", e))?;
                Ok(json!({}))
            }
            KinesisRequest::StopStreamEncryption(input) => {
                client
                    .stop_stream_encryption()
                    .encryption_type(sdk::EncryptionType::from(input.encryption_type.as_str()))
                    .key_id(input.key_id)
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("StopStreamEncryption", e))?;
                Ok(json!({}))
            }
            KinesisRequest::AddTagsToStream(input) => {
                client
                    .add_tags_to_stream()
                    .set_tags(Some(input.tags))
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("AddTagsToStream", e))?;
                Ok(json!({}))
            }
            KinesisRequest::RemoveTagsFromStream(input) => {
                client
                    .remove_tags_from_stream()
                    .set_tag_keys(Some(input.tag_keys))
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("RemoveTagsFromStream", e))?;
                Ok(json!({}))
            }
            KinesisRequest::ListTagsForStream(input) => {
                let output = client
                    .list_tags_for_stream()
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .set_exclusive_start_tag_key(input.exclusive_start_tag_key)
                    .set_limit(input.limit)
                    .send()
                    .await
                    .map_err(|e| service_error("ListTagsForStream", e))?;
                Ok(object([
                    ("Tags", output.tags().to_json()),
                    ("HasMoreTags", output.has_more_tags().to_json()),
                ]))
            }
            KinesisRequest::IncreaseStreamRetentionPeriod(input) => {
                client
                    .increase_stream_retention_period()
                    .retention_period_hours(input.retention_period_hours)
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("IncreaseStreamRetentionPeriod", e))?;
                Ok(json!({}))
            }
            KinesisRequest::DecreaseStreamRetentionPeriod(input) => {
                client
                    .decrease_stream_retention_period()
                    .retention_period_hours(input.retention_period_hours)
                    .set_stream_name(input.stream_name)
                    .set_stream_arn(input.stream_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("DecreaseStreamRetentionPeriod", e))?;
                Ok(json!({}))
            }
            KinesisRequest::RegisterStreamConsumer(input) => {
                let output = client
                    .register_stream_consumer()
                    .stream_arn(input.stream_arn)
                    .consumer_name(input.consumer_name)
                    .send()
                    .await
                    .map_err(|e| service_error("RegisterStreamConsumer", e))?;
                Ok(object([("Consumer", output.consumer().to_json())]))
            }
            KinesisRequest::DeregisterStreamConsumer(input) => {
                client
                    .deregister_stream_consumer()
                    .set_stream_arn(input.stream_arn)
                    .set_consumer_name(input.consumer_name)
                    .set_consumer_arn(input.consumer_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("DeregisterStreamConsumer", e))?;
                Ok(json!({}))
            }
            KinesisRequest::DescribeStreamConsumer(input) => {
                let output = client
                    .describe_stream_consumer()
                    .set_stream_arn(input.stream_arn)
                    .set_consumer_name(input.consumer_name)
                    .set_consumer_arn(input.consumer_arn)
                    .send()
                    .await
                    .map_err(|e| service_error("DescribeStreamConsumer", e))?;
                Ok(object([(
                    "ConsumerDescription",
                    output.consumer_description().to_json(),
                )]))
            }
            KinesisRequest::ListStreamConsumers(input) => {
                let output = client
                    .list_stream_consumers()
                    .stream_arn(input.stream_arn)
                    .set_next_token(input.next_token)
                    .set_max_results(input.max_results)
                    .set_stream_creation_timestamp(input.stream_creation_timestamp.map(DateTime::from_secs_f64))
                    .send()
                    .await
                    .map_err(|e| service_error("ListStreamConsumers", e))?;
                Ok(object([
                    ("Consumers", output.consumers().to_json()),
                    ("NextToken", output.next_token().to_json()),
                ]))
            }
        }
    }
}

/// Renders a service error the way the AWS CLI does, falling back to the full
/// error context for transport and credential failures.
fn service_error<E, R>(action: &str, err: SdkError<E, R>) -> eyre::Report
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    let detail = err.code().zip(err.message()).map(|(code, message)| {
        format!("An error occurred ({code}) when calling the {action} operation: {message}")
    });
    match detail {
        Some(detail) => eyre!(detail),
        None => eyre!("{}", DisplayErrorContext(err)),
    }
}

fn create_stream_request(client: &Client, input: CreateStreamInput) -> Result<CreateStreamFluentBuilder> {
    Ok(client
        .create_stream()
        .stream_name(input.stream_name)
        .set_shard_count(input.shard_count)
        .set_stream_mode_details(input.stream_mode_details.map(stream_mode_details).transpose()?))
}

fn list_shards_request(client: &Client, input: ListShardsInput) -> Result<ListShardsFluentBuilder> {
    Ok(client
        .list_shards()
        .set_stream_name(input.stream_name)
        .set_next_token(input.next_token)
        .set_exclusive_start_shard_id(input.exclusive_start_shard_id)
        .set_max_results(input.max_results)
        .set_stream_creation_timestamp(input.stream_creation_timestamp.map(DateTime::from_secs_f64))
        .set_shard_filter(input.shard_filter.map(shard_filter).transpose()?)
        .set_stream_arn(input.stream_arn))
}

fn put_record_request(client: &Client, input: PutRecordInput) -> PutRecordFluentBuilder {
    client
        .put_record()
        .data(Blob::new(input.data))
        .partition_key(input.partition_key)
        .set_stream_name(input.stream_name)
        .set_stream_arn(input.stream_arn)
        .set_explicit_hash_key(input.explicit_hash_key)
        .set_sequence_number_for_ordering(input.sequence_number_for_ordering)
}

fn put_records_request(client: &Client, input: PutRecordsInput) -> Result<PutRecordsFluentBuilder> {
    let entries = input
        .records
        .into_iter()
        .map(|entry| {
            sdk::PutRecordsRequestEntry::builder()
                .data(Blob::new(entry.data))
                .partition_key(entry.partition_key)
                .set_explicit_hash_key(entry.explicit_hash_key)
                .build()
                .wrap_err("Invalid put_records entry")
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(client
        .put_records()
        .set_records(Some(entries))
        .set_stream_name(input.stream_name)
        .set_stream_arn(input.stream_arn))
}

fn get_shard_iterator_request(client: &Client, input: GetShardIteratorInput) -> GetShardIteratorFluentBuilder {
    client
        .get_shard_iterator()
        .shard_id(input.shard_id)
        .shard_iterator_type(sdk::ShardIteratorType::from(input.shard_iterator_type.as_str()))
        .set_stream_name(input.stream_name)
        .set_stream_arn(input.stream_arn)
        .set_starting_sequence_number(input.starting_sequence_number)
        .set_timestamp(input.timestamp.map(DateTime::from_secs_f64))
}

fn stream_mode_details(details: StreamModeDetails) -> Result<sdk::StreamModeDetails> {
    sdk::StreamModeDetails::builder()
        .stream_mode(sdk::StreamMode::from(details.stream_mode.as_str()))
        .build()
        .wrap_err("Invalid stream mode details")
}

fn shard_filter(filter: ShardFilter) -> Result<sdk::ShardFilter> {
    sdk::ShardFilter::builder()
        .r#type(sdk::ShardFilterType::from(filter.filter_type.as_str()))
        .set_shard_id(filter.shard_id)
        .set_timestamp(filter.timestamp.map(DateTime::from_secs_f64))
        .build()
        .wrap_err("Invalid shard filter")
}

fn metric_names(metrics: &[MetricsName]) -> Vec<sdk::MetricsName> {
    metrics
        .iter()
        .map(|metric| sdk::MetricsName::from(metric.as_str()))
        .collect()
}
