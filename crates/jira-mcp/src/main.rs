//! Jira MCP server binary.
//!
//! This binary runs the MCP server using stdio transport.

use jira_client::{JiraClient, JiraConfig};
use jira_mcp::JiraMcpServer;
use jira_mcp::cli::ServeArgs;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries JSON-RPC, so diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jira_mcp=info,jira_client=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = ServeArgs::parse_args();
    let config = JiraConfig::load_with_overrides(args.config.as_deref(), args.overrides()).await?;

    tracing::info!(
        base_url = %config.base_url,
        default_project = config.default_project.as_deref().unwrap_or("-"),
        request_log = config.log_file.is_some(),
        "Starting jira-mcp server"
    );

    let client = JiraClient::connect(&config).await?;
    let server = JiraMcpServer::new(client);
    server.run().await?;

    Ok(())
}
