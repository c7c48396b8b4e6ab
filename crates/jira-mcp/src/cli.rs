//! Command-line flags for the `jira-mcp` binary.
//!
//! Flags form the highest configuration layer, above the `JIRA_*`
//! environment variables and the optional YAML file.

use clap::Parser;
use jira_client::ConfigLayer;
use std::path::PathBuf;

/// MCP server exposing Jira issues to AI assistants over stdio.
///
/// Credentials come from `JIRA_BASE_URL`, `JIRA_USER_EMAIL` and
/// `JIRA_API_TOKEN`, optionally layered over a `--config` file.
#[derive(Parser, Debug, Default)]
#[command(name = "jira-mcp")]
#[command(author, version, about, long_about = None)]
pub struct ServeArgs {
    /// YAML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append redacted request/response entries to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Project key used when a tool omits `project_key`
    #[arg(long, value_name = "KEY")]
    pub default_project: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,
}

impl ServeArgs {
    /// Parse arguments from the process command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The configuration layer these flags contribute.
    #[must_use]
    pub fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            log_file: self.log_file.clone(),
            default_project: self.default_project.clone(),
            timeout_ms: self.timeout_ms,
            strict_ssl: self.insecure.then_some(false),
            ..ConfigLayer::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_no_flags_override_nothing() {
        let args = ServeArgs::try_parse_from(["jira-mcp"]).unwrap();
        assert_eq!(args.overrides(), ConfigLayer::default());
        assert!(args.config.is_none());
    }

    #[test]
    fn test_flags_become_overrides() {
        let args = ServeArgs::try_parse_from([
            "jira-mcp",
            "--config",
            "jira.yaml",
            "--log-file",
            "/tmp/jira.log",
            "--default-project",
            "OPS",
            "--timeout-ms",
            "5000",
            "--insecure",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("jira.yaml")));
        let layer = args.overrides();
        assert_eq!(layer.log_file, Some(PathBuf::from("/tmp/jira.log")));
        assert_eq!(layer.default_project.as_deref(), Some("OPS"));
        assert_eq!(layer.timeout_ms, Some(5000));
        assert_eq!(layer.strict_ssl, Some(false));
        assert!(layer.api_token.is_none());
    }

    #[rstest]
    #[case(&["jira-mcp", "--timeout-ms", "soon"])]
    #[case(&["jira-mcp", "--unknown"])]
    fn test_invalid_flags_rejected(#[case] argv: &[&str]) {
        assert!(ServeArgs::try_parse_from(argv).is_err());
    }
}
