//! Argument structs for CLI commands.

use clap::Parser;

use crate::api::DEFAULT_MAX_RESULTS;
use crate::validation::{MAX_RESULTS_LIMIT, validate_issue_key};

fn parse_jql(s: &str) -> Result<String, String> {
    crate::validation::require_non_empty(s, "JQL")
}

fn parse_limit(s: &str) -> Result<u32, String> {
    let n: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number between 1 and {MAX_RESULTS_LIMIT}"))?;
    crate::validation::validate_max_results(n)
}

/// Arguments for the `search` command
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// JQL query, e.g. "project = OPS AND status != Done"
    #[arg(value_parser = parse_jql)]
    pub jql: String,

    /// Maximum number of issues to show (1-100)
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS, value_parser = parse_limit)]
    pub limit: u32,

    /// Index of the first result, for paging
    #[arg(long, default_value_t = 0)]
    pub start: u32,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Issue key (OPS-42) or numeric id
    #[arg(value_parser = validate_issue_key)]
    pub issue_key: String,
}

/// Arguments for the `transitions` command
#[derive(Parser, Debug, Clone)]
pub struct TransitionsArgs {
    /// Issue key (OPS-42) or numeric id
    #[arg(value_parser = validate_issue_key)]
    pub issue_key: String,
}
