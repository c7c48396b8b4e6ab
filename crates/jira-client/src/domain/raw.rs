//! Wire shapes of Jira REST v2 responses.
//!
//! Only the members the client reshapes are declared; everything is
//! defaulted so sparse responses (restricted `fields`, missing permissions)
//! still decode.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Named {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawStatus {
    pub name: Option<String>,
    pub status_category: Option<Named>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawUser {
    pub account_id: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub active: Option<bool>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawIssueRef {
    pub id: Option<String>,
    pub key: String,
    pub fields: RawRefFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawRefFields {
    pub summary: Option<String>,
    pub status: Option<RawStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawLinkType {
    pub id: Option<String>,
    pub name: String,
    pub inward: String,
    pub outward: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawIssueLink {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub link_type: RawLinkType,
    pub inward_issue: Option<RawIssueRef>,
    pub outward_issue: Option<RawIssueRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawFields {
    pub summary: Option<String>,
    pub description: Option<Value>,
    pub status: Option<RawStatus>,
    pub issuetype: Option<Named>,
    pub priority: Option<Named>,
    pub assignee: Option<RawUser>,
    pub reporter: Option<RawUser>,
    pub labels: Vec<String>,
    pub components: Vec<Named>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub resolution: Option<Named>,
    pub parent: Option<RawIssueRef>,
    pub subtasks: Vec<RawIssueRef>,
    pub issuelinks: Vec<RawIssueLink>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssue {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: RawFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSearch {
    #[serde(default)]
    pub start_at: u64,
    #[serde(default)]
    pub max_results: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComment {
    pub id: String,
    #[serde(default)]
    pub author: Option<RawUser>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCommentPage {
    #[serde(default)]
    pub start_at: u64,
    #[serde(default)]
    pub max_results: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub comments: Vec<RawComment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawTransitionField {
    pub required: bool,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTransition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub to: Option<RawStatus>,
    #[serde(default)]
    pub has_screen: bool,
    #[serde(default)]
    pub fields: BTreeMap<String, RawTransitionField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawTransitions {
    pub transitions: Vec<RawTransition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProject {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub project_type_key: Option<String>,
    #[serde(default)]
    pub lead: Option<RawUser>,
    #[serde(default)]
    pub issue_types: Vec<RawIssueType>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssueType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subtask: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComponent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lead: Option<RawUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPriority {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawLinkTypes {
    pub issue_link_types: Vec<RawLinkType>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCreated {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCreateMeta {
    pub projects: Vec<RawCreateMetaProject>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCreateMetaProject {
    pub key: String,
    pub issuetypes: Vec<RawCreateMetaIssueType>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCreateMetaIssueType {
    pub name: String,
    pub fields: BTreeMap<String, RawFieldMeta>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawFieldMeta {
    pub name: Option<String>,
    pub required: bool,
    pub schema: Option<RawFieldSchema>,
    pub has_default_value: bool,
    pub allowed_values: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawFieldSchema {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub items: Option<String>,
    pub custom: Option<String>,
}
