//! Site and project metadata lookups.

use super::non_blank;
use crate::client::JiraClient;
use crate::domain::raw::{RawComponent, RawCreateMeta, RawIssueType, RawPriority, RawProject};
use crate::domain::{Component, FieldMetadata, IssueType, IssueTypeFields, Priority, Project};
use crate::error::Result;
use crate::validation::FieldErrors;

/// Input for [`JiraClient::get_create_fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFieldsQuery {
    /// Falls back to the configured default project.
    pub project_key: Option<String>,
    /// Restrict to one issue type name.
    pub issue_type: Option<String>,
}

impl JiraClient {
    /// Projects visible to the current user.
    ///
    /// # Errors
    ///
    /// Returns the Jira error if the request fails.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let raw: Vec<RawProject> = self.get(&["project"], &[]).await?;
        Ok(raw.into_iter().map(Project::from).collect())
    }

    /// Issue types of a project, or of the whole site when `project_key`
    /// is `None` and no default project is configured.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed key, or the Jira error.
    pub async fn list_issue_types(&self, project_key: Option<&str>) -> Result<Vec<IssueType>> {
        let explicit = non_blank(project_key);
        if explicit.is_none() && self.default_project().is_none() {
            let raw: Vec<RawIssueType> = self.get(&["issuetype"], &[]).await?;
            return Ok(raw.into_iter().map(IssueType::from).collect());
        }

        let mut errors = FieldErrors::new();
        let key = self.resolve_project(explicit.as_deref(), &mut errors);
        errors.into_result()?;
        let key = key.unwrap_or_default();

        let project: RawProject = self.get(&["project", &key], &[]).await?;
        Ok(project.issue_types.into_iter().map(IssueType::from).collect())
    }

    /// Components of a project.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a missing or malformed key, or the
    /// Jira error.
    pub async fn list_components(&self, project_key: Option<&str>) -> Result<Vec<Component>> {
        let mut errors = FieldErrors::new();
        let key = self.resolve_project(non_blank(project_key).as_deref(), &mut errors);
        errors.into_result()?;
        let key = key.unwrap_or_default();

        let raw: Vec<RawComponent> = self.get(&["project", &key, "components"], &[]).await?;
        Ok(raw.into_iter().map(Component::from).collect())
    }

    /// Priorities defined on the site.
    ///
    /// # Errors
    ///
    /// Returns the Jira error if the request fails.
    pub async fn list_priorities(&self) -> Result<Vec<Priority>> {
        let raw: Vec<RawPriority> = self.get(&["priority"], &[]).await?;
        Ok(raw.into_iter().map(Priority::from).collect())
    }

    /// Fields on the create screen, per issue type.
    ///
    /// Required fields are listed first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a missing or malformed project key,
    /// or the Jira error.
    pub async fn get_create_fields(&self, query: &CreateFieldsQuery) -> Result<Vec<IssueTypeFields>> {
        let mut errors = FieldErrors::new();
        let key = self.resolve_project(non_blank(query.project_key.as_deref()).as_deref(), &mut errors);
        errors.into_result()?;
        let key = key.unwrap_or_default();

        let mut params = vec![
            ("projectKeys", key),
            ("expand", "projects.issuetypes.fields".to_string()),
        ];
        if let Some(issue_type) = non_blank(query.issue_type.as_deref()) {
            params.push(("issuetypeNames", issue_type));
        }

        let raw: RawCreateMeta = self.get(&["issue", "createmeta"], &params).await?;
        Ok(raw
            .projects
            .into_iter()
            .flat_map(|project| {
                let project_key = project.key;
                project.issuetypes.into_iter().map(move |issue_type| {
                    let mut fields: Vec<FieldMetadata> = issue_type
                        .fields
                        .into_iter()
                        .map(|(id, meta)| FieldMetadata::from_raw(id, meta))
                        .collect();
                    fields.sort_by(|a, b| b.required.cmp(&a.required).then_with(|| a.id.cmp(&b.id)));
                    IssueTypeFields {
                        project_key: project_key.clone(),
                        issue_type: issue_type.name,
                        fields,
                    }
                })
            })
            .collect())
    }
}
