//! Call wrappers applied to every operation, outermost first.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::Instrument;

use crate::catalog::OperationDescriptor;
use crate::error::GatewayError;
use crate::gateway::Invocation;

/// An operation about to run, with its resolved invocation context.
pub struct Call {
    pub operation: &'static OperationDescriptor,
    pub invocation: Invocation,
}

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, call: Call, next: Next<'_>) -> Result<Value, GatewayError>;
}

/// The remainder of the chain; the handler runs once it is empty.
pub struct Next<'a> {
    rest: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub fn new(chain: &'a [Arc<dyn Middleware>]) -> Self {
        Self { rest: chain }
    }

    pub async fn run(self, call: Call) -> Result<Value, GatewayError> {
        match self.rest.split_first() {
            Some((head, rest)) => head.handle(call, Next { rest }).await,
            None => (call.operation.handler)(call.invocation)
                .await
                .map_err(GatewayError::Operation),
        }
    }
}

/// Logs every call inside a span carrying the tool, action and region.
pub struct CallTracing;

#[async_trait]
impl Middleware for CallTracing {
    async fn handle(&self, call: Call, next: Next<'_>) -> Result<Value, GatewayError> {
        let span = tracing::info_span!(
            "tool_call",
            tool = call.operation.name,
            action = %call.operation.api_action(),
            region = %call.invocation.region,
        );
        async move {
            tracing::debug!("Calling Kinesis");
            let result = next.run(call).await;
            match &result {
                Ok(_) => tracing::info!("Kinesis call succeeded"),
                Err(e) => tracing::warn!(error = %e, "Kinesis call failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Refuses mutating operations while the read-only gate is set.
pub struct MutationGuard {
    read_only: bool,
}

impl MutationGuard {
    pub fn new(read_only: bool) -> Self {
        Self { read_only }
    }
}

#[async_trait]
impl Middleware for MutationGuard {
    async fn handle(&self, call: Call, next: Next<'_>) -> Result<Value, GatewayError> {
        if self.read_only && call.operation.mutating {
            return Err(GatewayError::MutationBlocked);
        }
        next.run(call).await
    }
}

/// Checks arguments against the operation's declared parameters.
pub struct ArgumentValidation;

#[async_trait]
impl Middleware for ArgumentValidation {
    async fn handle(&self, call: Call, next: Next<'_>) -> Result<Value, GatewayError> {
        call.operation.validate(&call.invocation.arguments)?;
        next.run(call).await
    }
}

/// The chain every gateway uses unless told otherwise.
pub fn default_chain(read_only: bool) -> Vec<Arc<dyn Middleware>> {
    vec![
        Arc::new(CallTracing),
        Arc::new(MutationGuard::new(read_only)),
        Arc::new(ArgumentValidation),
    ]
}
