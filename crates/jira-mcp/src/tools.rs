//! MCP tool implementations.
//!
//! Each method turns tool parameters into a `jira_client` request and
//! returns the reshaped result.

use crate::error::{Error, Result};
use crate::models::{
    AddCommentParams, CreateIssueParams, GetCommentsParams, GetCreateFieldsParams,
    GetIssueParams, LinkIssuesParams, SearchIssuesParams, TransitionIssueParams,
    UpdateIssueParams, parse_direction,
};
use jira_client::api::{
    CommentQuery, CreateFieldsQuery, DEFAULT_MAX_RESULTS, IssueUpdate, LinkDirection, LinkRequest,
    NewIssue, NewLink, SearchQuery, TransitionRequest,
};
use jira_client::domain::{
    Comment, CommentPage, Component, CreatedIssue, Issue, IssueLinkType, IssueType,
    IssueTypeFields, LinkSummary, Priority, Project, SearchResult, Transition, TransitionOutcome,
    UpdatedIssue, User,
};
use jira_client::{FieldErrors, JiraClient};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::info;

/// Tool implementations for the Jira MCP server.
#[derive(Debug, Clone)]
pub struct Tools {
    client: JiraClient,
}

impl Tools {
    /// Create tools backed by the given client.
    #[must_use]
    pub fn new(client: JiraClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &JiraClient {
        &self.client
    }

    /// Get the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns the Jira error, typically an authentication failure.
    pub async fn get_current_user(&self) -> Result<User> {
        Ok(self.client.myself().await?)
    }

    /// Run a JQL search.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank JQL or bad page size.
    pub async fn search_issues(&self, params: SearchIssuesParams) -> Result<SearchResult> {
        let query = SearchQuery::new(params.jql)
            .page(
                params.start_at.unwrap_or(0),
                params.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            )
            .fields(params.fields.unwrap_or_default());
        Ok(self.client.search_issues(&query).await?)
    }

    /// Fetch one issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed key, or the Jira error.
    pub async fn get_issue(&self, params: GetIssueParams) -> Result<Issue> {
        Ok(self
            .client
            .get_issue(&params.issue_key, params.expand.as_deref())
            .await?)
    }

    /// Create an issue and its links.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every bad field, including an
    /// unknown link direction, or the Jira error.
    pub async fn create_issue(&self, params: CreateIssueParams) -> Result<CreatedIssue> {
        let mut errors = FieldErrors::new();
        let links = params
            .links
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, link)| {
                let direction = match link.direction.as_deref().map(parse_direction) {
                    Some(Ok(direction)) => direction,
                    Some(Err(e)) => {
                        errors.add(format!("links[{i}].direction"), e.to_string());
                        LinkDirection::default()
                    }
                    None => LinkDirection::default(),
                };
                NewLink {
                    link_type: link.link_type,
                    issue_key: link.issue_key,
                    direction,
                }
            })
            .collect();

        let issue = NewIssue {
            project_key: params.project_key,
            summary: params.summary,
            issue_type: params.issue_type,
            description: params.description,
            priority: params.priority,
            assignee: params.assignee,
            labels: params.labels.unwrap_or_default(),
            components: params.components.unwrap_or_default(),
            parent_key: params.parent_key,
            custom_fields: into_map(params.custom_fields),
            links,
        };
        if !errors.is_empty() {
            return Err(rejected(errors, self.client.validate_new_issue(&issue)));
        }

        let created = self.client.create_issue(&issue).await?;
        info!(issue_key = %created.key, links = created.links.len(), "Created issue");
        Ok(created)
    }

    /// Update fields of an issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing every bad field, including an
    /// assignee combined with `unassign`, or the Jira error.
    pub async fn update_issue(&self, params: UpdateIssueParams) -> Result<UpdatedIssue> {
        let mut errors = FieldErrors::new();
        let assignee = match (params.assignee, params.unassign) {
            (Some(Some(_)), true) => {
                errors.add("assignee", "Cannot set an assignee and unassign at once");
                Some(None)
            }
            (Some(assignee), false) => Some(assignee),
            (_, true) => Some(None),
            (None, false) => None,
        };

        let update = IssueUpdate {
            summary: params.summary,
            description: params.description,
            priority: params.priority,
            assignee,
            labels: params.labels,
            components: params.components,
            custom_fields: into_map(params.custom_fields),
        };
        if !errors.is_empty() {
            return Err(rejected(errors, self.client.validate_update(&params.issue_key, &update)));
        }

        let updated = self.client.update_issue(&params.issue_key, &update).await?;
        info!(issue_key = %updated.issue_key, "Updated issue");
        Ok(updated)
    }

    /// Add a comment.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad key or blank body, or the Jira error.
    pub async fn add_comment(&self, params: AddCommentParams) -> Result<Comment> {
        Ok(self.client.add_comment(&params.issue_key, &params.body).await?)
    }

    /// List comments, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad key or page size, or the Jira error.
    pub async fn get_comments(&self, params: GetCommentsParams) -> Result<CommentPage> {
        let defaults = CommentQuery::default();
        let query = CommentQuery {
            start_at: params.start_at.unwrap_or(defaults.start_at),
            max_results: params.max_results.unwrap_or(defaults.max_results),
        };
        Ok(self.client.get_comments(&params.issue_key, query).await?)
    }

    /// List the transitions available for an issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad key, or the Jira error.
    pub async fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        Ok(self.client.get_transitions(issue_key).await?)
    }

    /// Move an issue through a transition, then comment.
    ///
    /// # Errors
    ///
    /// Returns the error from the transition call. A failed comment is
    /// reported inside the outcome instead.
    pub async fn transition_issue(&self, params: TransitionIssueParams) -> Result<TransitionOutcome> {
        let request = TransitionRequest {
            issue_key: params.issue_key,
            transition_id: params.transition_id,
            resolution: params.resolution,
            comment: params.comment,
            fields: into_map(params.fields),
        };
        let outcome = self.client.transition_issue(&request).await?;
        info!(
            issue_key = %outcome.issue_key,
            transition_id = %outcome.transition_id,
            comment_added = outcome.comment.added,
            "Transitioned issue"
        );
        Ok(outcome)
    }

    /// Link two existing issues.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad keys or a blank type, or the Jira error.
    pub async fn link_issues(&self, params: LinkIssuesParams) -> Result<LinkSummary> {
        let request = LinkRequest {
            link_type: params.link_type,
            inward_issue: params.inward_issue,
            outward_issue: params.outward_issue,
            comment: params.comment,
        };
        Ok(self.client.link_issues(&request).await?)
    }

    /// List visible projects.
    ///
    /// # Errors
    ///
    /// Returns the Jira error.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.client.list_projects().await?)
    }

    /// List issue types, for one project when a key is given or defaulted.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad key, or the Jira error.
    pub async fn list_issue_types(&self, project_key: Option<&str>) -> Result<Vec<IssueType>> {
        Ok(self.client.list_issue_types(project_key).await?)
    }

    /// List the components of a project.
    ///
    /// # Errors
    ///
    /// Returns a validation error when no project is given or defaulted.
    pub async fn list_components(&self, project_key: Option<&str>) -> Result<Vec<Component>> {
        Ok(self.client.list_components(project_key).await?)
    }

    /// List priorities.
    ///
    /// # Errors
    ///
    /// Returns the Jira error.
    pub async fn list_priorities(&self) -> Result<Vec<Priority>> {
        Ok(self.client.list_priorities().await?)
    }

    /// List issue link types.
    ///
    /// # Errors
    ///
    /// Returns the Jira error.
    pub async fn list_link_types(&self) -> Result<Vec<IssueLinkType>> {
        Ok(self.client.list_link_types().await?)
    }

    /// Describe the fields needed to create issues in a project.
    ///
    /// # Errors
    ///
    /// Returns a validation error when no project is given or defaulted.
    pub async fn get_create_fields(
        &self,
        params: GetCreateFieldsParams,
    ) -> Result<Vec<IssueTypeFields>> {
        let query = CreateFieldsQuery {
            project_key: params.project_key,
            issue_type: params.issue_type,
        };
        Ok(self.client.get_create_fields(&query).await?)
    }
}

/// Report local failures together with the client's own field checks.
fn rejected(mut errors: FieldErrors, client_check: jira_client::Result<()>) -> Error {
    if let Err(jira_client::Error::Validation(more)) = client_check {
        errors.merge(more);
    }
    jira_client::Error::Validation(errors).into()
}

fn into_map(fields: Option<BTreeMap<String, Value>>) -> Map<String, Value> {
    fields.unwrap_or_default().into_iter().collect()
}
