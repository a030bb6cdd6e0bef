pub mod json;
pub mod model;
pub mod sdk;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use eyre::Result;
use serde_json::Value;

pub use model::KinesisRequest;
pub use sdk::SdkClientFactory;

/// A Kinesis client bound to one region.
///
/// `call` returns the service response as JSON in the Kinesis wire shape:
/// PascalCase members, blobs as base64, timestamps as ISO-8601 strings and
/// absent members omitted.
#[async_trait]
pub trait KinesisBackend: Send + Sync {
    async fn call(&self, request: KinesisRequest) -> Result<Value>;
}

/// Builds a fresh [`KinesisBackend`] for every tool call.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn client(&self, region: &str) -> Result<Box<dyn KinesisBackend>>;
}
