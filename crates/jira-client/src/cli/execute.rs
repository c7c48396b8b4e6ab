//! Command execution logic.

use anyhow::Result;

use super::args::{SearchArgs, ShowArgs, TransitionsArgs};
use crate::api::SearchQuery;
use crate::client::JiraClient;
use crate::output::{self, OutputMode};

/// Execute the whoami command
pub async fn execute_whoami(client: &JiraClient, output_mode: OutputMode) -> Result<()> {
    let user = client.myself().await?;
    output::emit(&user, output_mode, |w, user, config| {
        output::write_user(w, user, config)
    })?;
    Ok(())
}

/// Execute the search command
pub async fn execute_search(
    client: &JiraClient,
    args: &SearchArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let query = SearchQuery::new(&args.jql).page(args.start, args.limit);
    let result = client.search_issues(&query).await?;
    output::emit(&result, output_mode, |w, result, config| {
        output::write_search(w, result, config)
    })?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(client: &JiraClient, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let issue = client.get_issue(&args.issue_key, None).await?;
    output::emit(&issue, output_mode, |w, issue, config| {
        output::write_issue(w, issue, config)
    })?;
    Ok(())
}

/// Execute the transitions command
pub async fn execute_transitions(
    client: &JiraClient,
    args: &TransitionsArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let transitions = client.get_transitions(&args.issue_key).await?;
    output::emit(&transitions, output_mode, |w, transitions, config| {
        output::write_transitions(w, transitions, config)
    })?;
    Ok(())
}

/// Execute the projects command
pub async fn execute_projects(client: &JiraClient, output_mode: OutputMode) -> Result<()> {
    let projects = client.list_projects().await?;
    output::emit(&projects, output_mode, |w, projects, config| {
        output::write_projects(w, projects, config)
    })?;
    Ok(())
}
