//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `whoami`: Show the user the credentials belong to
//! - `search`: Run a JQL search
//! - `show`: Show issue details
//! - `transitions`: List workflow transitions of an issue
//! - `projects`: List visible projects
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config`: YAML configuration file, overlaid by `JIRA_*` variables
//!
//! # Example
//!
//! ```bash
//! jira whoami
//! jira search "project = OPS AND resolution = Unresolved" --limit 20
//! jira show OPS-42
//! jira --json transitions OPS-42
//! ```

mod args;
mod execute;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{SearchArgs, ShowArgs, TransitionsArgs};

use crate::client::JiraClient;
use crate::config::JiraConfig;
use crate::output::OutputMode;

/// Command-line access to a Jira site.
///
/// Credentials come from `JIRA_BASE_URL`, `JIRA_USER_EMAIL` and
/// `JIRA_API_TOKEN`, optionally layered over a `--config` file.
#[derive(Parser, Debug)]
#[command(name = "jira")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// YAML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the user the credentials belong to
    ///
    /// Useful as a connectivity and credentials check.
    Whoami,

    /// Search issues with JQL
    Search(SearchArgs),

    /// Show issue details
    Show(ShowArgs),

    /// List transitions available on an issue
    Transitions(TransitionsArgs),

    /// List projects visible to the current user
    Projects,
}

impl Cli {
    /// Parse arguments from the process command line.
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse arguments from an iterator (for testing).
    ///
    /// # Errors
    ///
    /// Returns a clap error if parsing fails.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Load configuration, connect, and run the selected command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the Jira call fails.
    pub async fn execute(&self) -> Result<()> {
        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let config = JiraConfig::load(self.config.as_deref()).await?;
        let client = JiraClient::connect(&config).await?;

        match &self.command {
            Commands::Whoami => execute::execute_whoami(&client, output_mode).await,
            Commands::Search(args) => execute::execute_search(&client, args, output_mode).await,
            Commands::Show(args) => execute::execute_show(&client, args, output_mode).await,
            Commands::Transitions(args) => {
                execute::execute_transitions(&client, args, output_mode).await
            }
            Commands::Projects => execute::execute_projects(&client, output_mode).await,
        }
    }
}
