//! Jira CLI binary.

use anyhow::Result;
use jira_client::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the jira CLI.
///
/// Commands make one or two sequential requests, so a current-thread
/// runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=jira_client=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jira_client=warn,jira_log=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse_args();
    cli.execute().await?;

    Ok(())
}
