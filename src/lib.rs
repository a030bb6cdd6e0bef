pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod kinesis;
pub mod mcp_server;
pub mod middleware;
pub mod operations;
pub mod payload;

pub use config::GatewayConfig;
pub use error::{GatewayError, McpError};
pub use gateway::Gateway;
pub use mcp_server::KinesisMcpServer;
