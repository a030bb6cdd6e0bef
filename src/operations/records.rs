use eyre::{bail, Result};
use serde_json::{json, Value};

use super::{member, member_or, STREAM_ARN, STREAM_NAME};
use crate::catalog::{ParamKind, ParamSpec};
use crate::gateway::Invocation;
use crate::kinesis::model::{
    GetRecordsInput, GetShardIteratorInput, PutRecordArgs, PutRecordInput, PutRecordsArgs, PutRecordsInput,
    ShardIteratorType,
};
use crate::kinesis::KinesisRequest;
use crate::payload::annotate_record;

const PUT_RECORDS_ENTRY: &[ParamSpec] = &[
    ParamSpec::required("Data", ParamKind::Blob, "The record payload"),
    ParamSpec::required("PartitionKey", ParamKind::Str, "Determines which shard receives the record"),
    ParamSpec::optional("ExplicitHashKey", ParamKind::Str, "Hash value overriding the partition key hash"),
];

pub(super) const PUT_RECORD: &[ParamSpec] = &[
    ParamSpec::required(
        "data",
        ParamKind::Blob,
        "The record payload: base64 text, plain text, or an array of bytes",
    ),
    ParamSpec::required("partition_key", ParamKind::Str, "Determines which shard receives the record"),
    STREAM_NAME,
    STREAM_ARN,
    ParamSpec::optional(
        "explicit_hash_key",
        ParamKind::Str,
        "Hash value overriding the partition key hash",
    ),
    ParamSpec::optional(
        "sequence_number_for_ordering",
        ParamKind::Str,
        "Guarantees strictly increasing sequence numbers for the same partition key",
    ),
];

pub(super) const PUT_RECORDS: &[ParamSpec] = &[
    ParamSpec::required("records", ParamKind::ObjectList(PUT_RECORDS_ENTRY), "The records to write"),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) const GET_SHARD_ITERATOR: &[ParamSpec] = &[
    ParamSpec::required("shard_id", ParamKind::Str, "The shard ID of the shard to read from"),
    ParamSpec::required(
        "shard_iterator_type",
        ParamKind::Enum(ShardIteratorType::VALUES),
        "Where in the shard to start reading",
    ),
    STREAM_NAME,
    STREAM_ARN,
    ParamSpec::optional(
        "starting_sequence_number",
        ParamKind::Str,
        "Sequence number, for AT_SEQUENCE_NUMBER and AFTER_SEQUENCE_NUMBER",
    ),
    ParamSpec::optional("timestamp", ParamKind::Number, "Unix timestamp, for AT_TIMESTAMP"),
];

pub(super) const GET_RECORDS: &[ParamSpec] = &[
    ParamSpec::required("shard_iterator", ParamKind::Str, "The shard iterator to read from"),
    ParamSpec::optional("limit", ParamKind::int_range(1, 10000), "Maximum number of records to return"),
    STREAM_ARN,
];

pub(super) async fn put_record(invocation: Invocation) -> Result<Value> {
    let args: PutRecordArgs = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::PutRecord(PutRecordInput::from(args))).await?;
    Ok(json!({
        "ShardId": member(&response, "ShardId"),
        "SequenceNumber": member(&response, "SequenceNumber"),
        "EncryptionType": member(&response, "EncryptionType"),
    }))
}

pub(super) async fn put_records(invocation: Invocation) -> Result<Value> {
    let args: PutRecordsArgs = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::PutRecords(PutRecordsInput::from(args))).await?;
    Ok(json!({
        "FailedRecordCount": member_or(&response, "FailedRecordCount", json!(0)),
        "Records": member_or(&response, "Records", json!([])),
        "EncryptionType": member(&response, "EncryptionType"),
    }))
}

pub(super) async fn get_shard_iterator(invocation: Invocation) -> Result<Value> {
    let input: GetShardIteratorInput = invocation.params()?;
    match input.shard_iterator_type {
        ShardIteratorType::AtSequenceNumber | ShardIteratorType::AfterSequenceNumber
            if input.starting_sequence_number.is_none() =>
        {
            bail!(
                "starting_sequence_number is required for {}",
                input.shard_iterator_type.as_str()
            )
        }
        ShardIteratorType::AtTimestamp if input.timestamp.is_none() => {
            bail!("timestamp is required for AT_TIMESTAMP")
        }
        _ => {}
    }
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::GetShardIterator(input)).await?;
    Ok(json!({"ShardIterator": member(&response, "ShardIterator")}))
}

pub(super) async fn get_records(invocation: Invocation) -> Result<Value> {
    let input: GetRecordsInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::GetRecords(input)).await?;

    let mut records = member_or(&response, "Records", json!([]));
    if let Some(records) = records.as_array_mut() {
        for record in records.iter_mut().filter_map(Value::as_object_mut) {
            annotate_record(record)?;
        }
    }
    Ok(json!({
        "Records": records,
        "NextShardIterator": member(&response, "NextShardIterator"),
        "MillisBehindLatest": member(&response, "MillisBehindLatest"),
    }))
}
