//! Recording backend for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eyre::Result;
use serde_json::Value;

use super::{ClientFactory, KinesisBackend, KinesisRequest};
use crate::config::GatewayConfig;
use crate::gateway::Gateway;

#[derive(Debug, Default)]
struct Recorded {
    regions: Vec<String>,
    requests: Vec<KinesisRequest>,
}

/// Hands out clients that record every request and answer with a canned
/// response, or fail with a canned message.
#[derive(Clone, Default)]
pub struct MockFactory {
    recorded: Arc<Mutex<Recorded>>,
    response: Arc<Mutex<Value>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockFactory {
    pub fn responding(response: Value) -> Self {
        let factory = Self::default();
        *factory.response.lock().unwrap() = response;
        factory
    }

    pub fn failing(message: &str) -> Self {
        let factory = Self::default();
        *factory.failure.lock().unwrap() = Some(message.to_string());
        factory
    }

    /// Gateway with the default middleware chain, backed by this mock.
    pub fn gateway(&self, config: GatewayConfig) -> Gateway {
        Gateway::new(config, Arc::new(self.clone()))
    }

    pub fn regions(&self) -> Vec<String> {
        self.recorded.lock().unwrap().regions.clone()
    }

    pub fn requests(&self) -> Vec<KinesisRequest> {
        self.recorded.lock().unwrap().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.recorded.lock().unwrap().requests.len()
    }

    pub fn last_request(&self) -> KinesisRequest {
        self.requests().pop().expect("no request was recorded")
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn client(&self, region: &str) -> Result<Box<dyn KinesisBackend>> {
        self.recorded.lock().unwrap().regions.push(region.to_string());
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl KinesisBackend for MockFactory {
    async fn call(&self, request: KinesisRequest) -> Result<Value> {
        self.recorded.lock().unwrap().requests.push(request);
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(eyre::eyre!(message));
        }
        Ok(self.response.lock().unwrap().clone())
    }
}
