//! Reshaped Jira entities.
//!
//! Jira responses are large and deeply nested. These types keep the
//! members an assistant or terminal user needs, flattened to plain strings
//! where Jira wraps a name in an object.

pub(crate) mod raw;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use raw::{
    Named, RawComment, RawComponent, RawFieldMeta, RawIssue, RawIssueLink, RawIssueRef,
    RawIssueType, RawLinkType, RawPriority, RawProject, RawStatus, RawTransition, RawUser,
};

/// A Jira user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct User {
    /// Cloud account id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Server/Data Center user name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Email, when visible to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    /// Whether the account is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// IANA time zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl User {
    /// Best human-readable label: display name, then user name, then account id.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .or(self.account_id.as_deref())
            .unwrap_or("unknown")
    }
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        Self {
            account_id: raw.account_id,
            name: raw.name,
            display_name: raw.display_name,
            email_address: raw.email_address,
            active: raw.active,
            time_zone: raw.time_zone,
        }
    }
}

/// A reference to another issue (parent, subtask, link target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRef {
    /// Issue key, e.g. `OPS-7`.
    pub key: String,
    /// Summary, when Jira returned it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Status name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl From<RawIssueRef> for IssueRef {
    fn from(raw: RawIssueRef) -> Self {
        Self {
            key: raw.key,
            summary: raw.fields.summary,
            status: raw.fields.status.and_then(|s| s.name),
        }
    }
}

/// A link from the current issue to another one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLink {
    /// Link id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Link type name, e.g. `Blocks`.
    pub link_type: String,
    /// Relationship as read from this issue, e.g. `blocks` or `is blocked by`.
    pub relationship: String,
    /// The other issue.
    pub issue: IssueRef,
}

impl IssueLink {
    fn from_raw(raw: RawIssueLink) -> Option<Self> {
        let (relationship, issue) = match (raw.outward_issue, raw.inward_issue) {
            (Some(outward), _) => (raw.link_type.outward, outward),
            (None, Some(inward)) => (raw.link_type.inward, inward),
            (None, None) => return None,
        };
        Some(Self {
            id: raw.id,
            link_type: raw.link_type.name,
            relationship,
            issue: issue.into(),
        })
    }
}

/// A full issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    /// Numeric issue id.
    pub id: String,
    /// Issue key.
    pub key: String,
    /// Browse URL.
    pub url: String,
    /// One-line summary.
    pub summary: Option<String>,
    /// Status name.
    pub status: Option<String>,
    /// Status category, e.g. `To Do`, `In Progress` or `Done`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_category: Option<String>,
    /// Issue type name.
    pub issue_type: Option<String>,
    /// Priority name.
    pub priority: Option<String>,
    /// Current assignee.
    pub assignee: Option<User>,
    /// Reporter.
    pub reporter: Option<User>,
    /// Labels.
    pub labels: Vec<String>,
    /// Component names.
    pub components: Vec<String>,
    /// Description text.
    pub description: Option<String>,
    /// Creation timestamp as Jira formats it.
    pub created: Option<String>,
    /// Last update timestamp.
    pub updated: Option<String>,
    /// Resolution name, `None` while unresolved.
    pub resolution: Option<String>,
    /// Parent issue, for subtasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueRef>,
    /// Subtasks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<IssueRef>,
    /// Links to other issues.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<IssueLink>,
    /// Non-null `customfield_*` values, verbatim.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, Value>,
}

impl Issue {
    pub(crate) fn from_raw(raw: RawIssue, url: String) -> Self {
        let fields = raw.fields;
        let (status, status_category) = split_status(fields.status);
        let custom_fields = fields
            .other
            .into_iter()
            .filter(|(key, value)| key.starts_with("customfield_") && !value.is_null())
            .collect();

        Self {
            id: raw.id,
            key: raw.key,
            url,
            summary: fields.summary,
            status,
            status_category,
            issue_type: fields.issuetype.and_then(|t| t.name),
            priority: fields.priority.and_then(|p| p.name),
            assignee: fields.assignee.map(User::from),
            reporter: fields.reporter.map(User::from),
            labels: fields.labels,
            components: names(fields.components),
            description: fields.description.and_then(text_of),
            created: fields.created,
            updated: fields.updated,
            resolution: fields.resolution.and_then(|r| r.name),
            parent: fields.parent.map(IssueRef::from),
            subtasks: fields.subtasks.into_iter().map(IssueRef::from).collect(),
            links: fields
                .issuelinks
                .into_iter()
                .filter_map(IssueLink::from_raw)
                .collect(),
            custom_fields,
        }
    }
}

/// One row of a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    /// Issue key.
    pub key: String,
    /// Numeric issue id.
    pub id: String,
    /// Browse URL.
    pub url: String,
    /// One-line summary.
    pub summary: Option<String>,
    /// Status name.
    pub status: Option<String>,
    /// Issue type name.
    pub issue_type: Option<String>,
    /// Priority name.
    pub priority: Option<String>,
    /// Assignee label, `None` when unassigned.
    pub assignee: Option<String>,
    /// Last update timestamp.
    pub updated: Option<String>,
}

impl IssueSummary {
    pub(crate) fn from_raw(raw: RawIssue, url: String) -> Self {
        let fields = raw.fields;
        Self {
            key: raw.key,
            id: raw.id,
            url,
            summary: fields.summary,
            status: fields.status.and_then(|s| s.name),
            issue_type: fields.issuetype.and_then(|t| t.name),
            priority: fields.priority.and_then(|p| p.name),
            assignee: fields.assignee.map(|u| User::from(u).label().to_string()),
            updated: fields.updated,
        }
    }
}

/// A page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Total number of matching issues.
    pub total: u64,
    /// Index of the first issue in this page.
    pub start_at: u64,
    /// Page size Jira applied.
    pub max_results: u64,
    /// Issues in this page.
    pub issues: Vec<IssueSummary>,
}

/// An issue comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Comment id.
    pub id: String,
    /// Author label.
    pub author: Option<String>,
    /// Comment text.
    pub body: String,
    /// Creation timestamp.
    pub created: Option<String>,
    /// Last edit timestamp.
    pub updated: Option<String>,
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Self {
            id: raw.id,
            author: raw.author.map(|u| User::from(u).label().to_string()),
            body: raw.body.and_then(text_of).unwrap_or_default(),
            created: raw.created,
            updated: raw.updated,
        }
    }
}

/// A page of comments on one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentPage {
    /// Issue the comments belong to.
    pub issue_key: String,
    /// Total number of comments.
    pub total: u64,
    /// Index of the first comment in this page.
    pub start_at: u64,
    /// Page size Jira applied.
    pub max_results: u64,
    /// Comments in this page, oldest first.
    pub comments: Vec<Comment>,
}

/// A workflow transition available on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Transition id, passed to `transition_issue`.
    pub id: String,
    /// Transition name, e.g. `Start Progress`.
    pub name: String,
    /// Status the issue moves to.
    pub to_status: Option<String>,
    /// Whether the transition shows a screen.
    pub has_screen: bool,
    /// Field ids the transition screen requires.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
}

impl From<RawTransition> for Transition {
    fn from(raw: RawTransition) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            to_status: raw.to.and_then(|s| s.name),
            has_screen: raw.has_screen,
            required_fields: raw
                .fields
                .into_iter()
                .filter(|(_, field)| field.required)
                .map(|(id, _)| id)
                .collect(),
        }
    }
}

/// Result of the comment step of a transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommentOutcome {
    /// Whether a comment was posted.
    pub added: bool,
    /// Id of the posted comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Structured error when posting the comment failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Result of a status transition.
///
/// The transition and the comment are reported independently: a failed
/// comment leaves `transitioned` true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    /// Transitioned issue.
    pub issue_key: String,
    /// Transition that was applied.
    pub transition_id: String,
    /// Whether Jira accepted the transition.
    pub transitioned: bool,
    /// Outcome of the optional comment.
    pub comment: CommentOutcome,
}

/// A project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Numeric project id.
    pub id: String,
    /// Project key.
    pub key: String,
    /// Project name.
    pub name: String,
    /// Project type key, e.g. `software`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    /// Project lead label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<String>,
}

impl From<RawProject> for Project {
    fn from(raw: RawProject) -> Self {
        Self {
            id: raw.id,
            key: raw.key,
            name: raw.name,
            project_type: raw.project_type_key,
            lead: raw.lead.map(|u| User::from(u).label().to_string()),
        }
    }
}

/// An issue type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueType {
    /// Issue type id.
    pub id: String,
    /// Issue type name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether this is a subtask type.
    pub subtask: bool,
}

impl From<RawIssueType> for IssueType {
    fn from(raw: RawIssueType) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            description: raw.description.filter(|d| !d.is_empty()),
            subtask: raw.subtask,
        }
    }
}

/// A project component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    /// Component id.
    pub id: String,
    /// Component name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Component lead label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<String>,
}

impl From<RawComponent> for Component {
    fn from(raw: RawComponent) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            description: raw.description.filter(|d| !d.is_empty()),
            lead: raw.lead.map(|u| User::from(u).label().to_string()),
        }
    }
}

/// An issue priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Priority {
    /// Priority id.
    pub id: String,
    /// Priority name.
    pub name: String,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<RawPriority> for Priority {
    fn from(raw: RawPriority) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            description: raw.description.filter(|d| !d.is_empty()),
        }
    }
}

/// An issue link type with its two relationship phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLinkType {
    /// Link type id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Link type name.
    pub name: String,
    /// Phrase read from the inward issue, e.g. `is blocked by`.
    pub inward: String,
    /// Phrase read from the outward issue, e.g. `blocks`.
    pub outward: String,
}

impl From<RawLinkType> for IssueLinkType {
    fn from(raw: RawLinkType) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            inward: raw.inward,
            outward: raw.outward,
        }
    }
}

/// Metadata of one field on the create screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMetadata {
    /// Field id, e.g. `summary` or `customfield_10010`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether the create screen requires it.
    pub required: bool,
    /// Schema type, e.g. `string` or `array<string>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Whether Jira fills in a default.
    pub has_default_value: bool,
    /// Names (or values) of the allowed options, when the field is a choice.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

impl FieldMetadata {
    pub(crate) fn from_raw(id: String, raw: RawFieldMeta) -> Self {
        let schema_type = raw.schema.and_then(|s| match (s.kind, s.items) {
            (Some(kind), Some(items)) => Some(format!("{kind}<{items}>")),
            (kind, _) => kind,
        });
        Self {
            name: raw.name.unwrap_or_else(|| id.clone()),
            id,
            required: raw.required,
            schema_type,
            has_default_value: raw.has_default_value,
            allowed_values: raw.allowed_values.iter().filter_map(option_label).collect(),
        }
    }
}

/// Create-screen fields for one issue type of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueTypeFields {
    /// Project key.
    pub project_key: String,
    /// Issue type name.
    pub issue_type: String,
    /// Fields on the create screen.
    pub fields: Vec<FieldMetadata>,
}

/// A link created alongside a new issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    /// Link type name.
    pub link_type: String,
    /// Key of the inward issue.
    pub inward_issue: String,
    /// Key of the outward issue.
    pub outward_issue: String,
}

/// Result of creating an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedIssue {
    /// Numeric id of the new issue.
    pub id: String,
    /// Key of the new issue.
    pub key: String,
    /// Browse URL.
    pub url: String,
    /// Links created after the issue.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkSummary>,
}

/// Result of updating an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatedIssue {
    /// Updated issue.
    pub issue_key: String,
    /// Browse URL.
    pub url: String,
    /// Jira field ids that were sent.
    pub updated_fields: Vec<String>,
}

fn split_status(status: Option<RawStatus>) -> (Option<String>, Option<String>) {
    match status {
        Some(status) => (status.name, status.status_category.and_then(|c| c.name)),
        None => (None, None),
    }
}

fn names(items: Vec<Named>) -> Vec<String> {
    items.into_iter().filter_map(|n| n.name).collect()
}

/// Plain text of a description or comment body.
///
/// REST v2 returns strings; anything else (e.g. a rich-text document) is
/// kept as its JSON text.
fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn option_label(value: &Value) -> Option<String> {
    ["name", "value", "key", "id"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}
