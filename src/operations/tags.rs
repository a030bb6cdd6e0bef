use eyre::Result;
use serde_json::{json, Value};

use super::{member_or, STREAM_ARN, STREAM_NAME};
use crate::catalog::{ParamKind, ParamSpec};
use crate::gateway::Invocation;
use crate::kinesis::model::{AddTagsToStreamInput, ListTagsForStreamInput, RemoveTagsFromStreamInput};
use crate::kinesis::KinesisRequest;

pub(super) const ADD_TAGS_TO_STREAM: &[ParamSpec] = &[
    ParamSpec::required("tags", ParamKind::StrMap, "Tag keys and values to set"),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) const REMOVE_TAGS_FROM_STREAM: &[ParamSpec] = &[
    ParamSpec::required("tag_keys", ParamKind::StrList, "Tag keys to remove"),
    STREAM_NAME,
    STREAM_ARN,
];

pub(super) const LIST_TAGS_FOR_STREAM: &[ParamSpec] = &[
    STREAM_NAME,
    STREAM_ARN,
    ParamSpec::optional(
        "exclusive_start_tag_key",
        ParamKind::Str,
        "Tag key to start listing from (for pagination)",
    ),
    ParamSpec::optional("limit", ParamKind::int_range(1, 50), "Maximum number of tags to return"),
];

pub(super) async fn add_tags_to_stream(invocation: Invocation) -> Result<Value> {
    let input: AddTagsToStreamInput = invocation.params()?;
    let client = invocation.client().await?;
    client.call(KinesisRequest::AddTagsToStream(input)).await?;
    Ok(json!({"Status": "Tags added successfully"}))
}

pub(super) async fn remove_tags_from_stream(invocation: Invocation) -> Result<Value> {
    let input: RemoveTagsFromStreamInput = invocation.params()?;
    let client = invocation.client().await?;
    client.call(KinesisRequest::RemoveTagsFromStream(input)).await?;
    Ok(json!({"Status": "Tags removed successfully"}))
}

pub(super) async fn list_tags_for_stream(invocation: Invocation) -> Result<Value> {
    let input: ListTagsForStreamInput = invocation.params()?;
    let client = invocation.client().await?;
    let response = client.call(KinesisRequest::ListTagsForStream(input)).await?;
    Ok(json!({
        "Tags": member_or(&response, "Tags", json!([])),
        "HasMoreTags": member_or(&response, "HasMoreTags", json!(false)),
    }))
}
