use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::error::{is_error_envelope, McpError, Result, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR};
use crate::gateway::Gateway;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_NAME: &str = "kinesis-mcp-server";

const INSTRUCTIONS: &str = "Tools for Amazon Kinesis Data Streams. Every tool accepts an optional \
region_name; otherwise AWS_REGION is used, falling back to us-west-2. Record data passed to \
put_record and put_records is sent base64-decoded when it is valid base64 and as UTF-8 text \
otherwise. Failed calls return a JSON object with a single \"error\" member.";

/// JSON-RPC message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    Request(JsonRpcRequest),
    Response(JsonRpcResponse),
    Notification(JsonRpcNotification),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// MCP server speaking newline-delimited JSON-RPC.
///
/// Requests are served on their own tasks, so a slow Kinesis call does not hold
/// up the ones behind it. A single writer task owns the output stream.
#[derive(Clone)]
pub struct KinesisMcpServer {
    gateway: Gateway,
}

impl KinesisMcpServer {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Serves stdin/stdout until stdin closes.
    pub async fn run(&self) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serves one connection. Returns once the input is exhausted and every
    /// in-flight response has been written.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let message = match parse_message(&line) {
                Ok(message) => message,
                Err(response) => {
                    if tx.send(response).is_err() {
                        break;
                    }
                    continue;
                }
            };

            match message {
                JsonRpcMessage::Request(request) => {
                    let server = self.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let response = server.handle_request(request).await;
                        if tx.send(response).is_err() {
                            tracing::warn!("Response dropped, writer has stopped");
                        }
                    });
                }
                JsonRpcMessage::Notification(notification) => self.handle_notification(notification),
                JsonRpcMessage::Response(response) => {
                    tracing::debug!(id = %response.id, "Ignoring unexpected response");
                }
            }
        }

        drop(tx);
        writer_task
            .await
            .map_err(|e| McpError::JsonRpc(format!("Response writer failed: {e}")))?
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, id = %request.id, "Handling request");
        let id = request.id;
        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize_result(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.gateway.tool_definitions() })),
            "tools/call" => self.handle_tool_call(request.params).await,
            method => {
                return JsonRpcResponse::failure(id, METHOD_NOT_FOUND, format!("Method '{method}' not found"));
            }
        };
        match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::failure(id, e.code(), e.to_string()),
        }
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        let client = params
            .and_then(|params| params.pointer("/clientInfo/name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        tracing::info!(client, read_only = self.gateway.config().read_only, "Client initialized");

        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": INSTRUCTIONS
        })
    }

    async fn handle_tool_call(&self, params: Option<Value>) -> Result<Value> {
        let params = params.ok_or_else(|| McpError::InvalidRequest("Missing params for tools/call".to_string()))?;
        let tool_call: ToolCall = serde_json::from_value(params)?;

        let result = self
            .gateway
            .call_tool(&tool_call.name, tool_call.arguments)
            .await
            .ok_or(McpError::UnknownTool(tool_call.name))?;

        Ok(json!({
            "content": [
                {
                    "type": "text",
                    "text": result.to_string()
                }
            ],
            "isError": is_error_envelope(&result)
        }))
    }

    fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => tracing::debug!("Client finished initialization"),
            method => tracing::debug!(method, "Ignoring notification"),
        }
    }
}

/// Splits malformed input into the two JSON-RPC failures: text that is not
/// JSON at all, and JSON that is not a message.
fn parse_message(line: &str) -> std::result::Result<JsonRpcMessage, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        tracing::warn!(error = %e, "Dropping unparsable message");
        JsonRpcResponse::failure(Value::Null, PARSE_ERROR, format!("Parse error: {e}"))
    })?;
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(error = %e, "Dropping malformed message");
        JsonRpcResponse::failure(id, INVALID_REQUEST, format!("Invalid request: {e}"))
    })
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
