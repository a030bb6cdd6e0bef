//! The tool table and its handlers.
//!
//! Handlers parse their arguments, make exactly one Kinesis call and pick the
//! members of the response they report. Read-only gating, argument validation
//! and error envelopes are handled by the gateway's middleware chain.

mod consumers;
mod records;
mod shards;
mod streams;
mod tags;

use serde_json::Value;

use crate::catalog::{BoxFuture, Handler, OperationDescriptor, ParamKind, ParamSpec};
use crate::gateway::Invocation;

macro_rules! handler {
    ($f:path) => {{
        fn call(invocation: Invocation) -> BoxFuture<'static, eyre::Result<Value>> {
            Box::pin($f(invocation))
        }
        call as Handler
    }};
}

const STREAM_NAME_REQUIRED: ParamSpec =
    ParamSpec::required("stream_name", ParamKind::Str, "The name of the Kinesis data stream");
const STREAM_NAME: ParamSpec = ParamSpec::optional("stream_name", ParamKind::Str, "The name of the stream");
const STREAM_ARN: ParamSpec =
    ParamSpec::optional("stream_arn", ParamKind::Str, "The ARN of the Kinesis data stream");
const STREAM_ARN_REQUIRED: ParamSpec =
    ParamSpec::required("stream_arn", ParamKind::Str, "The ARN of the Kinesis data stream");
const NEXT_TOKEN: ParamSpec = ParamSpec::optional("next_token", ParamKind::Str, "Token for pagination");
const STREAM_CREATION_TIMESTAMP: ParamSpec = ParamSpec::optional(
    "stream_creation_timestamp",
    ParamKind::Number,
    "Timestamp when the stream was created (Unix timestamp)",
);

const STREAM_MODE_FIELDS: &[ParamSpec] = &[ParamSpec::required(
    "StreamMode",
    ParamKind::Enum(crate::kinesis::model::StreamMode::VALUES),
    "PROVISIONED or ON_DEMAND",
)];

/// Every tool the server advertises.
pub static OPERATIONS: &[OperationDescriptor] = &[
    OperationDescriptor {
        name: "create_stream",
        description: "Creates a Kinesis data stream. Streams can be created in PROVISIONED mode (specify a shard count) or ON_DEMAND mode (capacity scales automatically).",
        mutating: true,
        params: streams::CREATE_STREAM,
        handler: handler!(streams::create_stream),
    },
    OperationDescriptor {
        name: "delete_stream",
        description: "Deletes a Kinesis data stream together with all of its shards and data. This cannot be undone.",
        mutating: true,
        params: streams::DELETE_STREAM,
        handler: handler!(streams::delete_stream),
    },
    OperationDescriptor {
        name: "describe_stream",
        description: "Returns detailed information about a Kinesis data stream, including its shards, status and configuration.",
        mutating: false,
        params: streams::DESCRIBE_STREAM,
        handler: handler!(streams::describe_stream),
    },
    OperationDescriptor {
        name: "describe_stream_summary",
        description: "Returns a summary of a Kinesis data stream without shard details. Cheaper than describe_stream for basic information.",
        mutating: false,
        params: streams::DESCRIBE_STREAM_SUMMARY,
        handler: handler!(streams::describe_stream_summary),
    },
    OperationDescriptor {
        name: "list_streams",
        description: "Lists the Kinesis data streams in the account and region.",
        mutating: false,
        params: streams::LIST_STREAMS,
        handler: handler!(streams::list_streams),
    },
    OperationDescriptor {
        name: "list_shards",
        description: "Lists the shards of a Kinesis data stream.",
        mutating: false,
        params: shards::LIST_SHARDS,
        handler: handler!(shards::list_shards),
    },
    OperationDescriptor {
        name: "update_shard_count",
        description: "Changes the shard count of a PROVISIONED stream. Not available for ON_DEMAND streams.",
        mutating: true,
        params: shards::UPDATE_SHARD_COUNT,
        handler: handler!(shards::update_shard_count),
    },
    OperationDescriptor {
        name: "update_stream_mode",
        description: "Switches the capacity mode of a stream between PROVISIONED and ON_DEMAND.",
        mutating: true,
        params: streams::UPDATE_STREAM_MODE,
        handler: handler!(streams::update_stream_mode),
    },
    OperationDescriptor {
        name: "put_record",
        description: "Writes a single data record into a Kinesis data stream. String data is sent base64-decoded when it is valid base64, otherwise as UTF-8 bytes.",
        mutating: true,
        params: records::PUT_RECORD,
        handler: handler!(records::put_record),
    },
    OperationDescriptor {
        name: "put_records",
        description: "Writes multiple data records into a Kinesis data stream in a single call.",
        mutating: true,
        params: records::PUT_RECORDS,
        handler: handler!(records::put_records),
    },
    OperationDescriptor {
        name: "get_shard_iterator",
        description: "Gets a shard iterator for reading records from a specific shard.",
        mutating: false,
        params: records::GET_SHARD_ITERATOR,
        handler: handler!(records::get_shard_iterator),
    },
    OperationDescriptor {
        name: "get_records",
        description: "Reads records from a shard using a shard iterator. Record data is returned as DataString when it is UTF-8, otherwise as DataBase64.",
        mutating: false,
        params: records::GET_RECORDS,
        handler: handler!(records::get_records),
    },
    OperationDescriptor {
        name: "merge_shards",
        description: "Merges two adjacent shards of a PROVISIONED stream.",
        mutating: true,
        params: shards::MERGE_SHARDS,
        handler: handler!(shards::merge_shards),
    },
    OperationDescriptor {
        name: "split_shard",
        description: "Splits a shard of a PROVISIONED stream into two new shards.",
        mutating: true,
        params: shards::SPLIT_SHARD,
        handler: handler!(shards::split_shard),
    },
    OperationDescriptor {
        name: "enable_enhanced_monitoring",
        description: "Enables shard-level CloudWatch metrics for a Kinesis data stream.",
        mutating: true,
        params: shards::ENABLE_ENHANCED_MONITORING,
        handler: handler!(shards::enable_enhanced_monitoring),
    },
    OperationDescriptor {
        name: "disable_enhanced_monitoring",
        description: "Disables shard-level CloudWatch metrics for a Kinesis data stream.",
        mutating: true,
        params: shards::DISABLE_ENHANCED_MONITORING,
        handler: handler!(shards::disable_enhanced_monitoring),
    },
    OperationDescriptor {
        name: "start_stream_encryption",
        description: "Enables server-side encryption of a Kinesis data stream with an AWS KMS key.",
        mutating: true,
        params: streams::START_STREAM_ENCRYPTION,
        handler: handler!(streams::start_stream_encryption),
    },
    OperationDescriptor {
        name: "stop_stream_encryption",
        description: "Disables server-side encryption of a Kinesis data stream.",
        mutating: true,
        params: streams::STOP_STREAM_ENCRYPTION,
        handler: handler!(streams::stop_stream_encryption),
    },
    OperationDescriptor {
        name: "add_tags_to_stream",
        description: "Adds or updates tags on a Kinesis data stream.",
        mutating: true,
        params: tags::ADD_TAGS_TO_STREAM,
        handler: handler!(tags::add_tags_to_stream),
    },
    OperationDescriptor {
        name: "remove_tags_from_stream",
        description: "Removes tags from a Kinesis data stream.",
        mutating: true,
        params: tags::REMOVE_TAGS_FROM_STREAM,
        handler: handler!(tags::remove_tags_from_stream),
    },
    OperationDescriptor {
        name: "list_tags_for_stream",
        description: "Lists the tags of a Kinesis data stream.",
        mutating: false,
        params: tags::LIST_TAGS_FOR_STREAM,
        handler: handler!(tags::list_tags_for_stream),
    },
    OperationDescriptor {
        name: "increase_stream_retention_period",
        description: "Increases the data retention period of a Kinesis data stream.",
        mutating: true,
        params: streams::RETENTION_PERIOD,
        handler: handler!(streams::increase_stream_retention_period),
    },
    OperationDescriptor {
        name: "decrease_stream_retention_period",
        description: "Decreases the data retention period of a Kinesis data stream.",
        mutating: true,
        params: streams::RETENTION_PERIOD,
        handler: handler!(streams::decrease_stream_retention_period),
    },
    OperationDescriptor {
        name: "register_stream_consumer",
        description: "Registers an enhanced fan-out consumer with a Kinesis data stream.",
        mutating: true,
        params: consumers::REGISTER_STREAM_CONSUMER,
        handler: handler!(consumers::register_stream_consumer),
    },
    OperationDescriptor {
        name: "deregister_stream_consumer",
        description: "Deregisters a consumer from a Kinesis data stream.",
        mutating: true,
        params: consumers::CONSUMER_LOOKUP,
        handler: handler!(consumers::deregister_stream_consumer),
    },
    OperationDescriptor {
        name: "describe_stream_consumer",
        description: "Returns information about a registered stream consumer.",
        mutating: false,
        params: consumers::CONSUMER_LOOKUP,
        handler: handler!(consumers::describe_stream_consumer),
    },
    OperationDescriptor {
        name: "list_stream_consumers",
        description: "Lists the consumers registered with a Kinesis data stream.",
        mutating: false,
        params: consumers::LIST_STREAM_CONSUMERS,
        handler: handler!(consumers::list_stream_consumers),
    },
];

/// Response member, or `null` when the service omitted it.
fn member(response: &Value, key: &str) -> Value {
    response.get(key).cloned().unwrap_or(Value::Null)
}

fn member_or(response: &Value, key: &str, default: Value) -> Value {
    response.get(key).cloned().unwrap_or(default)
}
