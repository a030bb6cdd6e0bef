use eyre::Result;
use serde_json::{json, Value};

use super::{member, member_or, NEXT_TOKEN, STREAM_ARN, STREAM_CREATION_TIMESTAMP, STREAM_NAME, STREAM_NAME_REQUIRED};
use crate::catalog::{ParamKind, ParamSpec};
use crate::gateway::Invocation;
use crate::kinesis::model::{
    EnhancedMonitoringInput, ListShardsInput, MergeShardsInput, MetricsName, ScalingType, ShardFilterType,
    SplitShardInput, UpdateShardCountInput,
};
use crate::kinesis::KinesisRequest;

const SHARD_FILTER_FIELDS: &[ParamSpec] = &[
    ParamSpec::required("Type", ParamKind::Enum(ShardFilterType::VALUES), "The shard filter type"),
    ParamSpec::optional("ShardId", ParamKind::Str, "Shard ID, for AFTER_SHARD_ID"),
    ParamSpec::optional(
        "Timestamp",
        ParamKind::Number,
        "Unix timestamp, for AT_TIMESTAMP and FROM_TIMESTAMP",
    ),
];

pub(super) const LIST_SHARDS: &[ParamSpec] = &[
    STREAM_NAME,
    NEXT_TOKEN,
    ParamSpec::optional(
        "exclusive_start_shard_id",
        ParamKind::Str,
        "Shard ID to start listing from (for pagination)",
    ),
    ParamSpec::optional("max_results", ParamKind::int_range(1, 10000), "Maximum number of shards to return"),
    STREAM_CREATION_TIMESTAMP,
    ParamSpec::optional("shard_filter", ParamKind::Object(SHARD_FILTER_FIELDS), "Filter for the listed shards"),
    STREAM_ARN,
];

pub(super) const UPDATE_SHARD_COUNT: &[ParamSpec] = &[
    STREAM_NAME_REQUIRED,
    ParamSpec::required("target_shard_count", ParamKind::int_min(1), "The new number of shards"),
    ParamSpec::optional("scaling_type", ParamKind::Enum(ScalingType::VALUES), "The scaling type to use")
        .with_default("UNIFORM_SCALING"),
];

pub(super) const MERGE_SHARDS: &[ParamSpec] = &[
    ParamSpec::required("shard_to_merge", ParamKind::Str, "The shard ID of the shard to combine"),
    ParamSpec::required(
        "adjacent_shard_to_merge",
        ParamKind::Str,
        "The shard ID of the adjacent shard to combine",
    ),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) const SPLIT_SHARD: &[ParamSpec] = &[
    ParamSpec::required("shard_to_split", ParamKind::Str, "The shard ID of the shard to split"),
    ParamSpec::required(
        "new_starting_hash_key",
        ParamKind::Str,
        "Hash key value for the starting hash key of one of the child shards",
    ),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) const ENABLE_ENHANCED_MONITORING: &[ParamSpec] = &[
    ParamSpec::required(
        "shard_level_metrics",
        ParamKind::EnumList(MetricsName::VALUES),
        "Shard-level metrics to enable",
    ),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) const DISABLE_ENHANCED_MONITORING: &[ParamSpec] = &[
    ParamSpec::required(
        "shard_level_metrics",
        ParamKind::EnumList(MetricsName::VALUES),
        "Shard-level metrics to disable",
    ),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) async fn list_shards(invocation: Invocation) -> Result<Value> {
    let input: ListShardsInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::ListShards(input)).await?;
    Ok(json!({
        "Shards": member_or(&response, "Shards", json!([])),
        "NextToken": member(&response, "NextToken"),
    }))
}

pub(super) async fn update_shard_count(invocation: Invocation) -> Result<Value> {
    let input: UpdateShardCountInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::UpdateShardCount(input)).await?;
    Ok(json!({
        "StreamName": member(&response, "StreamName"),
        "CurrentShardCount": member(&response, "CurrentShardCount"),
        "TargetShardCount": member(&response, "TargetShardCount"),
    }))
}

pub(super) async fn merge_shards(invocation: Invocation) -> Result<Value> {
    let input: MergeShardsInput = invocation.params()?;
    let client = invocation.client().await?;
    client.call(KinesisRequest::MergeShards(input)).await?;
    Ok(json!({"Status": "Merge initiated"}))
}

pub(super) async fn split_shard(invocation: Invocation) -> Result<Value> {
    let input: SplitShardInput = invocation.params()?;
    let client = invocation.client().await?;
    client.call(KinesisRequest::SplitShard(input)).await?;
    Ok(json!({"Status": "Split initiated"}))
}

pub(super) async fn enable_enhanced_monitoring(invocation: Invocation) -> Result<Value> {
    let input: EnhancedMonitoringInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::EnableEnhancedMonitoring(input)).await?;
    Ok(monitoring_status(&response))
}

pub(super) async fn disable_enhanced_monitoring(invocation: Invocation) -> Result<Value> {
    let input: EnhancedMonitoringInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::DisableEnhancedMonitoring(input)).await?;
    Ok(monitoring_status(&response))
}

fn monitoring_status(response: &Value) -> Value {
    json!({
        "StreamName": member(response, "StreamName"),
        "CurrentShardLevelMetrics": member_or(response, "CurrentShardLevelMetrics", json!([])),
        "DesiredShardLevelMetrics": member_or(response, "DesiredShardLevelMetrics", json!([])),
    })
}
