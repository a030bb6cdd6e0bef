//! Conversion of SDK response shapes into wire-style JSON.

use aws_sdk_kinesis::primitives::{Blob, DateTime, DateTimeFormat};
use aws_sdk_kinesis::types::{
    Consumer, ConsumerDescription, ConsumerStatus, EncryptionType, EnhancedMetrics, HashKeyRange,
    MetricsName, PutRecordsResultEntry, Record, SequenceNumberRange, Shard, StreamDescription,
    StreamDescriptionSummary, StreamMode, StreamModeDetails, StreamStatus, StreamSummary, Tag,
};
use serde_json::{Map, Value};

use crate::payload::to_base64;

pub trait ToJson {
    fn to_json(self) -> Value;
}

/// Object from `(member, value)` pairs, dropping null members.
pub fn object<const N: usize>(members: [(&str, Value); N]) -> Value {
    let map: Map<String, Value> = members
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    Value::Object(map)
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(self) -> Value {
        self.map(ToJson::to_json).unwrap_or(Value::Null)
    }
}

impl<'a, T> ToJson for &'a [T]
where
    &'a T: ToJson,
{
    fn to_json(self) -> Value {
        Value::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl ToJson for &str {
    fn to_json(self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToJson for &String {
    fn to_json(self) -> Value {
        Value::String(self.clone())
    }
}

impl ToJson for bool {
    fn to_json(self) -> Value {
        Value::Bool(self)
    }
}

impl ToJson for i32 {
    fn to_json(self) -> Value {
        Value::from(self)
    }
}

impl ToJson for i64 {
    fn to_json(self) -> Value {
        Value::from(self)
    }
}

impl ToJson for &Blob {
    fn to_json(self) -> Value {
        Value::String(to_base64(self.as_ref()))
    }
}

impl ToJson for &DateTime {
    fn to_json(self) -> Value {
        match self.fmt(DateTimeFormat::DateTime) {
            Ok(formatted) => Value::String(formatted),
            Err(_) => Value::from(self.as_secs_f64()),
        }
    }
}

macro_rules! sdk_enum_to_json {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToJson for &$ty {
                fn to_json(self) -> Value {
                    Value::String(self.as_str().to_string())
                }
            }
        )+
    };
}

sdk_enum_to_json!(StreamStatus, StreamMode, EncryptionType, MetricsName, ConsumerStatus);

impl ToJson for &StreamModeDetails {
    fn to_json(self) -> Value {
        object([("StreamMode", self.stream_mode().to_json())])
    }
}

impl ToJson for &HashKeyRange {
    fn to_json(self) -> Value {
        object([
            ("StartingHashKey", self.starting_hash_key().to_json()),
            ("EndingHashKey", self.ending_hash_key().to_json()),
        ])
    }
}

impl ToJson for &SequenceNumberRange {
    fn to_json(self) -> Value {
        object([
            ("StartingSequenceNumber", self.starting_sequence_number().to_json()),
            ("EndingSequenceNumber", self.ending_sequence_number().to_json()),
        ])
    }
}

impl ToJson for &Shard {
    fn to_json(self) -> Value {
        object([
            ("ShardId", self.shard_id().to_json()),
            ("ParentShardId", self.parent_shard_id().to_json()),
            ("AdjacentParentShardId", self.adjacent_parent_shard_id().to_json()),
            ("HashKeyRange", self.hash_key_range().to_json()),
            ("SequenceNumberRange", self.sequence_number_range().to_json()),
        ])
    }
}

impl ToJson for &EnhancedMetrics {
    fn to_json(self) -> Value {
        object([("ShardLevelMetrics", self.shard_level_metrics().to_json())])
    }
}

impl ToJson for &StreamDescription {
    fn to_json(self) -> Value {
        object([
            ("StreamName", self.stream_name().to_json()),
            ("StreamARN", self.stream_arn().to_json()),
            ("StreamStatus", self.stream_status().to_json()),
            ("StreamModeDetails", self.stream_mode_details().to_json()),
            ("Shards", self.shards().to_json()),
            ("HasMoreShards", self.has_more_shards().to_json()),
            ("RetentionPeriodHours", self.retention_period_hours().to_json()),
            ("StreamCreationTimestamp", self.stream_creation_timestamp().to_json()),
            ("EnhancedMonitoring", self.enhanced_monitoring().to_json()),
            ("EncryptionType", self.encryption_type().to_json()),
            ("KeyId", self.key_id().to_json()),
        ])
    }
}

impl ToJson for &StreamDescriptionSummary {
    fn to_json(self) -> Value {
        object([
            ("StreamName", self.stream_name().to_json()),
            ("StreamARN", self.stream_arn().to_json()),
            ("StreamStatus", self.stream_status().to_json()),
            ("StreamModeDetails", self.stream_mode_details().to_json()),
            ("RetentionPeriodHours", self.retention_period_hours().to_json()),
            ("StreamCreationTimestamp", self.stream_creation_timestamp().to_json()),
            ("EnhancedMonitoring", self.enhanced_monitoring().to_json()),
            ("EncryptionType", self.encryption_type().to_json()),
            ("KeyId", self.key_id().to_json()),
            ("OpenShardCount", self.open_shard_count().to_json()),
            ("ConsumerCount", self.consumer_count().to_json()),
        ])
    }
}

impl ToJson for &StreamSummary {
    fn to_json(self) -> Value {
        object([
            ("StreamName", self.stream_name().to_json()),
            ("StreamARN", self.stream_arn().to_json()),
            ("StreamStatus", self.stream_status().to_json()),
            ("StreamModeDetails", self.stream_mode_details().to_json()),
            ("StreamCreationTimestamp", self.stream_creation_timestamp().to_json()),
        ])
    }
}

impl ToJson for &Record {
    fn to_json(self) -> Value {
        object([
            ("SequenceNumber", self.sequence_number().to_json()),
            (
                "ApproximateArrivalTimestamp",
                self.approximate_arrival_timestamp().to_json(),
            ),
            ("Data", self.data().to_json()),
            ("PartitionKey", self.partition_key().to_json()),
            ("EncryptionType", self.encryption_type().to_json()),
        ])
    }
}

impl ToJson for &PutRecordsResultEntry {
    fn to_json(self) -> Value {
        object([
            ("SequenceNumber", self.sequence_number().to_json()),
            ("ShardId", self.shard_id().to_json()),
            ("ErrorCode", self.error_code().to_json()),
            ("ErrorMessage", self.error_message().to_json()),
        ])
    }
}

impl ToJson for &Tag {
    fn to_json(self) -> Value {
        object([("Key", self.key().to_json()), ("Value", self.value().to_json())])
    }
}

impl ToJson for &Consumer {
    fn to_json(self) -> Value {
        object([
            ("ConsumerName", self.consumer_name().to_json()),
            ("ConsumerARN", self.consumer_arn().to_json()),
            ("ConsumerStatus", self.consumer_status().to_json()),
            (
                "ConsumerCreationTimestamp",
                self.consumer_creation_timestamp().to_json(),
            ),
        ])
    }
}

impl ToJson for &ConsumerDescription {
    fn to_json(self) -> Value {
        object([
            ("ConsumerName", self.consumer_name().to_json()),
            ("ConsumerARN", self.consumer_arn().to_json()),
            ("ConsumerStatus", self.consumer_status().to_json()),
            (
                "ConsumerCreationTimestamp",
                self.consumer_creation_timestamp().to_json(),
            ),
            ("StreamARN", self.stream_arn().to_json()),
        ])
    }
}
