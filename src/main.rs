use kinesis_mcp_server::error::Result;
use kinesis_mcp_server::{Gateway, KinesisMcpServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries JSON-RPC, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kinesis_mcp_server=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let gateway = Gateway::from_env();
    tracing::info!(
        read_only = gateway.config().read_only,
        region = %gateway.config().resolve_region(None),
        "Starting Kinesis MCP server..."
    );

    let server = KinesisMcpServer::new(gateway);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
