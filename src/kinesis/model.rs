//! Typed inputs for every Kinesis action the server exposes.
//!
//! Field names follow the tool argument names, so most inputs deserialize
//! directly from the arguments of a tool call. Absent optional fields stay
//! `None` and are never sent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::payload::DataBlob;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }
    };
}

string_enum!(StreamMode {
    Provisioned => "PROVISIONED",
    OnDemand => "ON_DEMAND",
});

string_enum!(ShardIteratorType {
    AtSequenceNumber => "AT_SEQUENCE_NUMBER",
    AfterSequenceNumber => "AFTER_SEQUENCE_NUMBER",
    TrimHorizon => "TRIM_HORIZON",
    Latest => "LATEST",
    AtTimestamp => "AT_TIMESTAMP",
});

string_enum!(ScalingType {
    UniformScaling => "UNIFORM_SCALING",
});

string_enum!(
    /// Server-side encryption applied by stream encryption calls.
    EncryptionType {
        Kms => "KMS",
    }
);

string_enum!(MetricsName {
    IncomingBytes => "IncomingBytes",
    IncomingRecords => "IncomingRecords",
    OutgoingBytes => "OutgoingBytes",
    OutgoingRecords => "OutgoingRecords",
    WriteProvisionedThroughputExceeded => "WriteProvisionedThroughputExceeded",
    ReadProvisionedThroughputExceeded => "ReadProvisionedThroughputExceeded",
    IteratorAgeMilliseconds => "IteratorAgeMilliseconds",
    All => "ALL",
});

string_enum!(ShardFilterType {
    AfterShardId => "AFTER_SHARD_ID",
    AtTrimHorizon => "AT_TRIM_HORIZON",
    FromTrimHorizon => "FROM_TRIM_HORIZON",
    AtLatest => "AT_LATEST",
    AtTimestamp => "AT_TIMESTAMP",
    FromTimestamp => "FROM_TIMESTAMP",
});

impl Default for ScalingType {
    fn default() -> Self {
        Self::UniformScaling
    }
}

impl Default for EncryptionType {
    fn default() -> Self {
        Self::Kms
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamModeDetails {
    #[serde(rename = "StreamMode")]
    pub stream_mode: StreamMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShardFilter {
    #[serde(rename = "Type")]
    pub filter_type: ShardFilterType,
    #[serde(rename = "ShardId")]
    pub shard_id: Option<String>,
    #[serde(rename = "Timestamp")]
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateStreamInput {
    pub stream_name: String,
    pub shard_count: Option<i32>,
    pub stream_mode_details: Option<StreamModeDetails>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteStreamInput {
    pub stream_name: String,
    pub enforce_consumer_deletion: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DescribeStreamInput {
    pub stream_name: String,
    pub limit: Option<i32>,
    pub exclusive_start_shard_id: Option<String>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DescribeStreamSummaryInput {
    pub stream_name: String,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListStreamsInput {
    pub limit: Option<i32>,
    pub exclusive_start_stream_name: Option<String>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListShardsInput {
    pub stream_name: Option<String>,
    pub next_token: Option<String>,
    pub exclusive_start_shard_id: Option<String>,
    pub max_results: Option<i32>,
    pub stream_creation_timestamp: Option<f64>,
    pub shard_filter: Option<ShardFilter>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateShardCountInput {
    pub stream_name: String,
    pub target_shard_count: i32,
    #[serde(default)]
    pub scaling_type: ScalingType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateStreamModeInput {
    pub stream_arn: String,
    pub stream_mode_details: StreamModeDetails,
}

/// Arguments of `put_record` before the payload is resolved to bytes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PutRecordArgs {
    pub data: DataBlob,
    pub partition_key: String,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
    pub explicit_hash_key: Option<String>,
    pub sequence_number_for_ordering: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutRecordInput {
    pub data: Vec<u8>,
    pub partition_key: String,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
    pub explicit_hash_key: Option<String>,
    pub sequence_number_for_ordering: Option<String>,
}

impl From<PutRecordArgs> for PutRecordInput {
    fn from(args: PutRecordArgs) -> Self {
        Self {
            data: args.data.into_bytes(),
            partition_key: args.partition_key,
            stream_name: args.stream_name,
            stream_arn: args.stream_arn,
            explicit_hash_key: args.explicit_hash_key,
            sequence_number_for_ordering: args.sequence_number_for_ordering,
        }
    }
}

/// One entry of the `records` argument of `put_records`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PutRecordsEntryArgs {
    #[serde(rename = "Data")]
    pub data: DataBlob,
    #[serde(rename = "PartitionKey")]
    pub partition_key: String,
    #[serde(rename = "ExplicitHashKey")]
    pub explicit_hash_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PutRecordsArgs {
    pub records: Vec<PutRecordsEntryArgs>,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutRecordsEntry {
    pub data: Vec<u8>,
    pub partition_key: String,
    pub explicit_hash_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutRecordsInput {
    pub records: Vec<PutRecordsEntry>,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
}

impl From<PutRecordsArgs> for PutRecordsInput {
    fn from(args: PutRecordsArgs) -> Self {
        let records = args
            .records
            .into_iter()
            .map(|entry| PutRecordsEntry {
                data: entry.data.into_bytes(),
                partition_key: entry.partition_key,
                explicit_hash_key: entry.explicit_hash_key,
            })
            .collect();
        Self {
            records,
            stream_name: args.stream_name,
            stream_arn: args.stream_arn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetShardIteratorInput {
    pub shard_id: String,
    pub shard_iterator_type: ShardIteratorType,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
    pub starting_sequence_number: Option<String>,
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetRecordsInput {
    pub shard_iterator: String,
    pub limit: Option<i32>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MergeShardsInput {
    pub shard_to_merge: String,
    pub adjacent_shard_to_merge: String,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SplitShardInput {
    pub shard_to_split: String,
    pub new_starting_hash_key: String,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
}

/// Shared by enabling and disabling enhanced monitoring.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnhancedMonitoringInput {
    pub shard_level_metrics: Vec<MetricsName>,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
}

/// Shared by starting and stopping stream encryption.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamEncryptionInput {
    pub key_id: String,
    #[serde(default)]
    pub encryption_type: EncryptionType,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddTagsToStreamInput {
    pub tags: HashMap<String, String>,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoveTagsFromStreamInput {
    pub tag_keys: Vec<String>,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListTagsForStreamInput {
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
    pub exclusive_start_tag_key: Option<String>,
    pub limit: Option<i32>,
}

/// Shared by increasing and decreasing the retention period.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetentionPeriodInput {
    pub retention_period_hours: i32,
    pub stream_name: Option<String>,
    pub stream_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterStreamConsumerInput {
    pub stream_arn: String,
    pub consumer_name: String,
}

/// Identifies a consumer either by stream ARN and name or by consumer ARN.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConsumerLookupInput {
    pub stream_arn: Option<String>,
    pub consumer_name: Option<String>,
    pub consumer_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListStreamConsumersInput {
    pub stream_arn: String,
    pub next_token: Option<String>,
    pub max_results: Option<i32>,
    pub stream_creation_timestamp: Option<f64>,
}

/// A single call against the Kinesis API.
#[derive(Debug, Clone, PartialEq)]
pub enum KinesisRequest {
    CreateStream(CreateStreamInput),
    DeleteStream(DeleteStreamInput),
    DescribeStream(DescribeStreamInput),
    DescribeStreamSummary(DescribeStreamSummaryInput),
    ListStreams(ListStreamsInput),
    ListShards(ListShardsInput),
    UpdateShardCount(UpdateShardCountInput),
    UpdateStreamMode(UpdateStreamModeInput),
    PutRecord(PutRecordInput),
    PutRecords(PutRecordsInput),
    GetShardIterator(GetShardIteratorInput),
    GetRecords(GetRecordsInput),
    MergeShards(MergeShardsInput),
    SplitShard(SplitShardInput),
    EnableEnhancedMonitoring(EnhancedMonitoringInput),
    DisableEnhancedMonitoring(EnhancedMonitoringInput),
    StartStreamEncryption(StreamEncryptionInput),
    StopStreamEncryption(StreamEncryptionInput),
    AddTagsToStream(AddTagsToStreamInput),
    RemoveTagsFromStream(RemoveTagsFromStreamInput),
    ListTagsForStream(ListTagsForStreamInput),
    IncreaseStreamRetentionPeriod(RetentionPeriodInput),
    DecreaseStreamRetentionPeriod(RetentionPeriodInput),
    RegisterStreamConsumer(RegisterStreamConsumerInput),
    DeregisterStreamConsumer(ConsumerLookupInput),
    DescribeStreamConsumer(ConsumerLookupInput),
    ListStreamConsumers(ListStreamConsumersInput),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_absent_fields_stay_unset() {
        let input: CreateStreamInput = serde_json::from_value(json!({"stream_name": "orders"})).unwrap();
        assert_eq!(input.shard_count, None);
        assert_eq!(input.stream_mode_details, None);
    }

    #[test]
    fn test_enum_defaults() {
        let input: UpdateShardCountInput =
            serde_json::from_value(json!({"stream_name": "s", "target_shard_count": 2})).unwrap();
        assert_eq!(input.scaling_type, ScalingType::UniformScaling);

        let input: StreamEncryptionInput = serde_json::from_value(json!({"key_id": "alias/k"})).unwrap();
        assert_eq!(input.encryption_type.as_str(), "KMS");
    }

    #[test]
    fn test_nested_wire_names() {
        let input: ListShardsInput = serde_json::from_value(json!({
            "shard_filter": {"Type": "AFTER_SHARD_ID", "ShardId": "shardId-000000000001"}
        }))
        .unwrap();
        let filter = input.shard_filter.unwrap();
        assert_eq!(filter.filter_type, ShardFilterType::AfterShardId);
        assert_eq!(filter.shard_id.as_deref(), Some("shardId-000000000001"));
        assert_eq!(MetricsName::All.as_str(), "ALL");
    }

    #[test]
    fn test_put_records_args_resolve_payloads() {
        let args: PutRecordsArgs = serde_json::from_value(json!({
            "records": [
                {"Data": "aGVsbG8=", "PartitionKey": "a"},
                {"Data": "plain text", "PartitionKey": "b", "ExplicitHashKey": "42"}
            ],
            "stream_name": "orders"
        }))
        .unwrap();
        let input = PutRecordsInput::from(args);
        assert_eq!(input.records[0].data, b"hello");
        assert_eq!(input.records[1].data, b"plain text");
        assert_eq!(input.records[1].explicit_hash_key.as_deref(), Some("42"));
        assert_eq!(input.stream_name.as_deref(), Some("orders"));
    }
}
