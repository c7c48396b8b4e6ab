//! MCP tool parameter models.
//!
//! These types describe the JSON arguments each tool accepts. Their JSON
//! schemas are derived with `schemars` and published in the tool list.
//! Responses are the `jira_client::domain` types serialized as-is.

use crate::error::{Error, Result};
use jira_client::api::LinkDirection;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parameters for the `search_issues` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchIssuesParams {
    /// JQL query, e.g. `project = OPS AND status = "In Progress"`.
    pub jql: String,

    /// Index of the first result (default 0).
    pub start_at: Option<u32>,

    /// Page size, 1 to 100 (default 50).
    pub max_results: Option<u32>,

    /// Fields to return (default: summary, status, issuetype, priority, assignee, updated).
    pub fields: Option<Vec<String>>,
}

/// Parameters for the `get_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    /// Issue key (e.g. `OPS-123`) or numeric id.
    pub issue_key: String,

    /// Comma-separated expansions, e.g. `changelog,renderedFields`.
    pub expand: Option<String>,
}

/// A link to create right after a new issue.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LinkParams {
    /// Link type name, e.g. `Blocks` or `Relates`.
    pub link_type: String,

    /// The existing issue to link to.
    pub issue_key: String,

    /// `outward` (new issue is the outward side, default) or `inward`.
    pub direction: Option<String>,
}

/// Parameters for the `create_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    /// Project key. Falls back to the server's default project.
    pub project_key: Option<String>,

    /// One-line summary (at most 255 characters).
    pub summary: String,

    /// Issue type name, e.g. `Task`, `Bug`, `Story`.
    pub issue_type: String,

    /// Description in Jira wiki markup.
    pub description: Option<String>,

    /// Priority name, e.g. `High`.
    pub priority: Option<String>,

    /// Assignee account id.
    pub assignee: Option<String>,

    /// Labels (no whitespace).
    pub labels: Option<Vec<String>>,

    /// Component names.
    pub components: Option<Vec<String>>,

    /// Parent issue key, for subtasks.
    pub parent_key: Option<String>,

    /// Custom field values keyed by `customfield_<n>`.
    pub custom_fields: Option<BTreeMap<String, Value>>,

    /// Links to add once the issue exists.
    pub links: Option<Vec<LinkParams>>,
}

/// Parameters for the `update_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateIssueParams {
    /// Issue key to update.
    pub issue_key: String,

    /// New summary.
    pub summary: Option<String>,

    /// New description.
    pub description: Option<String>,

    /// New priority name.
    pub priority: Option<String>,

    /// New assignee account id, or `null` to unassign.
    #[serde(default, deserialize_with = "explicit_null")]
    #[schemars(with = "Option<String>")]
    pub assignee: Option<Option<String>>,

    /// Set to true to remove the assignee. Same as `assignee: null`.
    #[serde(default)]
    pub unassign: bool,

    /// Replacement labels.
    pub labels: Option<Vec<String>>,

    /// Replacement component names.
    pub components: Option<Vec<String>>,

    /// Custom field values keyed by `customfield_<n>`.
    pub custom_fields: Option<BTreeMap<String, Value>>,
}

/// Parameters for the `add_comment` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// Issue key to comment on.
    pub issue_key: String,

    /// Comment text in Jira wiki markup.
    pub body: String,
}

/// Parameters for the `get_comments` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCommentsParams {
    /// Issue key.
    pub issue_key: String,

    /// Index of the first comment (default 0).
    pub start_at: Option<u32>,

    /// Page size, 1 to 100 (default 50).
    pub max_results: Option<u32>,
}

/// Parameters for the `get_transitions` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTransitionsParams {
    /// Issue key.
    pub issue_key: String,
}

/// Parameters for the `transition_issue` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TransitionIssueParams {
    /// Issue key.
    pub issue_key: String,

    /// Numeric transition id, from `get_transitions`.
    pub transition_id: String,

    /// Resolution name, e.g. `Done` or `Won't Do`.
    pub resolution: Option<String>,

    /// Comment added after the transition succeeds.
    pub comment: Option<String>,

    /// Extra fields required by the transition screen.
    pub fields: Option<BTreeMap<String, Value>>,
}

/// Parameters for the `link_issues` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LinkIssuesParams {
    /// Link type name, e.g. `Blocks`.
    pub link_type: String,

    /// Inward side, e.g. the issue that "is blocked by".
    pub inward_issue: String,

    /// Outward side, e.g. the issue that "blocks".
    pub outward_issue: String,

    /// Optional comment added with the link.
    pub comment: Option<String>,
}

/// Parameters for tools scoped to one project.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProjectParams {
    /// Project key. Falls back to the server's default project.
    pub project_key: Option<String>,
}

/// Parameters for the `get_create_fields` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCreateFieldsParams {
    /// Project key. Falls back to the server's default project.
    pub project_key: Option<String>,

    /// Restrict to one issue type name.
    pub issue_type: Option<String>,
}

/// Keeps an explicit `null` (`Some(None)`) apart from a missing field (`None`).
fn explicit_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Parse a link direction string.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for anything but `outward` or `inward`.
pub fn parse_direction(s: &str) -> Result<LinkDirection> {
    match s.trim().to_lowercase().as_str() {
        "outward" | "out" => Ok(LinkDirection::Outward),
        "inward" | "in" => Ok(LinkDirection::Inward),
        _ => Err(Error::InvalidArgument {
            field: "direction",
            value: s.to_string(),
            valid_values: "outward, inward",
        }),
    }
}
