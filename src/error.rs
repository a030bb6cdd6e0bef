use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum McpError {
    #[error("JSON-RPC error: {0}")]
    JsonRpc(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Tool '{0}' not found")]
    UnknownTool(String),
}

impl McpError {
    /// JSON-RPC error code reported for this failure.
    pub fn code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => METHOD_NOT_FOUND,
            McpError::Serialization(_) | McpError::InvalidRequest(_) => INVALID_PARAMS,
            McpError::JsonRpc(_) | McpError::Io(_) => INTERNAL_ERROR,
        }
    }
}

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

pub type Result<T> = std::result::Result<T, McpError>;

/// Failure of a single tool call. Every variant is reported to the caller as
/// an error envelope, never as a transport error.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Mutation not allowed: KINESIS-MCP-READONLY is set to true.")]
    MutationBlocked,

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("{0:#}")]
    Operation(eyre::Report),
}

impl GatewayError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn into_envelope(self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<eyre::Report> for GatewayError {
    fn from(report: eyre::Report) -> Self {
        Self::Operation(report)
    }
}

/// True when `value` is an `{"error": ...}` envelope.
pub fn is_error_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.len() == 1 && object.contains_key("error"))
}

#[cfg(test)]
mod tests {
    use eyre::WrapErr;

    use super::*;

    #[test]
    fn test_envelopes() {
        assert_eq!(
            GatewayError::MutationBlocked.into_envelope(),
            json!({"error": "Mutation not allowed: KINESIS-MCP-READONLY is set to true."})
        );
        assert_eq!(
            GatewayError::invalid("limit", "must be at most 50").into_envelope(),
            json!({"error": "Invalid argument 'limit': must be at most 50"})
        );
    }

    #[test]
    fn test_operation_error_keeps_context_chain() {
        let report = Err::<(), _>(std::io::Error::other("connection reset"))
            .wrap_err("Unable to load credentials")
            .unwrap_err();
        let message = GatewayError::from(report).to_string();
        assert!(message.contains("Unable to load credentials"), "{message}");
        assert!(message.contains("connection reset"), "{message}");
    }

    #[test]
    fn test_rpc_codes() {
        assert_eq!(McpError::UnknownTool("x".into()).code(), METHOD_NOT_FOUND);
        assert_eq!(McpError::InvalidRequest("x".into()).code(), INVALID_PARAMS);
        assert_eq!(McpError::JsonRpc("x".into()).code(), INTERNAL_ERROR);
        assert_eq!(McpError::UnknownTool("x".into()).to_string(), "Tool 'x' not found");
    }

    #[test]
    fn test_is_error_envelope() {
        assert!(is_error_envelope(&json!({"error": "boom"})));
        assert!(!is_error_envelope(&json!({"error": "boom", "Status": "x"})));
        assert!(!is_error_envelope(&json!({"Status": "ok"})));
    }
}
