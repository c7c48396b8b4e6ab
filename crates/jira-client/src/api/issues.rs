//! Reading, creating and updating issues.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use super::{check_custom_fields, non_blank};
use crate::client::JiraClient;
use crate::domain::raw::{RawCreated, RawIssue};
use crate::domain::{CreatedIssue, Issue, LinkSummary, UpdatedIssue};
use crate::error::Result;
use crate::validation::{
    FieldErrors, require_non_empty, validate_issue_key, validate_label, validate_summary,
};

/// Which side of a link the new issue takes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// The new issue is the `outwardIssue` (e.g. "NEW blocks OTHER").
    #[default]
    Outward,
    /// The new issue is the `inwardIssue` (e.g. "NEW is blocked by OTHER").
    Inward,
}

/// A link to create once a new issue exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    /// Link type name, e.g. `Blocks`.
    pub link_type: String,
    /// The existing issue on the other side.
    pub issue_key: String,
    /// Side of the new issue.
    pub direction: LinkDirection,
}

impl NewLink {
    /// `(inward, outward)` keys once the new issue's key is known.
    fn sides(&self, new_key: &str) -> (String, String) {
        match self.direction {
            LinkDirection::Outward => (self.issue_key.clone(), new_key.to_string()),
            LinkDirection::Inward => (new_key.to_string(), self.issue_key.clone()),
        }
    }
}

/// Input for [`JiraClient::create_issue`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewIssue {
    /// Falls back to the configured default project.
    pub project_key: Option<String>,
    /// One-line summary, at most 255 characters.
    pub summary: String,
    /// Issue type name, e.g. `Task`.
    pub issue_type: String,
    /// Description in wiki markup.
    pub description: Option<String>,
    /// Priority name.
    pub priority: Option<String>,
    /// Assignee account id.
    pub assignee: Option<String>,
    /// Labels, each without whitespace.
    pub labels: Vec<String>,
    /// Component names.
    pub components: Vec<String>,
    /// Parent key for subtasks.
    pub parent_key: Option<String>,
    /// `customfield_<n>` values, sent verbatim.
    pub custom_fields: Map<String, Value>,
    /// Links to add once the issue exists.
    pub links: Vec<NewLink>,
}

/// Changes for [`JiraClient::update_issue`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueUpdate {
    /// New summary.
    pub summary: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority name.
    pub priority: Option<String>,
    /// `Some(None)` unassigns.
    pub assignee: Option<Option<String>>,
    /// Replaces all labels.
    pub labels: Option<Vec<String>>,
    /// Replaces all components.
    pub components: Option<Vec<String>>,
    /// `customfield_<n>` values, sent verbatim.
    pub custom_fields: Map<String, Value>,
}

/// Validated create payload plus the links to add afterwards.
#[derive(Debug)]
struct CreatePlan {
    fields: Map<String, Value>,
    links: Vec<NewLink>,
}

impl JiraClient {
    /// Fetch one issue by key or id.
    ///
    /// `expand` is passed through (e.g. `changelog,renderedFields`).
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed key, or the Jira error
    /// ([`ErrorKind::NotFound`](crate::ErrorKind::NotFound) when missing or hidden).
    pub async fn get_issue(&self, issue_key: &str, expand: Option<&str>) -> Result<Issue> {
        let key = checked_key(issue_key)?;
        let query: Vec<(&str, String)> = non_blank(expand)
            .map(|e| vec![("expand", e)])
            .unwrap_or_default();

        let raw: RawIssue = self.get(&["issue", &key], &query).await?;
        let url = self.browse_url(&raw.key);
        Ok(Issue::from_raw(raw, url))
    }

    /// Create an issue, then its links concurrently.
    ///
    /// The first failing link is returned as the error; the issue itself
    /// stays created.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the first Jira error.
    pub async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
        let plan = self.plan_create(issue)?;

        let created: RawCreated = self
            .post(&["issue"], json!({ "fields": plan.fields }))
            .await?;
        info!(issue_key = %created.key, "Created issue");

        let links = try_join_all(plan.links.iter().map(|link| {
            let (inward, outward) = link.sides(&created.key);
            async move {
                self.create_link(&link.link_type, &inward, &outward, None)
                    .await
                    .map(|()| LinkSummary {
                        link_type: link.link_type.clone(),
                        inward_issue: inward,
                        outward_issue: outward,
                    })
            }
        }))
        .await?;

        Ok(CreatedIssue {
            url: self.browse_url(&created.key),
            id: created.id,
            key: created.key,
            links,
        })
    }

    /// Check a [`NewIssue`] without sending anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) listing every
    /// invalid field.
    pub fn validate_new_issue(&self, issue: &NewIssue) -> Result<()> {
        self.plan_create(issue).map(drop)
    }

    /// Check an [`IssueUpdate`] without sending anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) listing every
    /// invalid field, or `fields` when nothing would change.
    pub fn validate_update(&self, issue_key: &str, update: &IssueUpdate) -> Result<()> {
        plan_update(issue_key, update).map(drop)
    }

    fn plan_create(&self, issue: &NewIssue) -> Result<CreatePlan> {
        let mut errors = FieldErrors::new();
        let project =
            self.resolve_project(non_blank(issue.project_key.as_deref()).as_deref(), &mut errors);
        let summary = errors.check("summary", validate_summary(&issue.summary));
        let issue_type = errors.check("issue_type", require_non_empty(&issue.issue_type, "Issue type"));
        let labels = check_labels(&issue.labels, &mut errors);
        let parent = issue
            .parent_key
            .as_deref()
            .and_then(|key| errors.check("parent_key", validate_issue_key(key)));
        check_custom_fields(&issue.custom_fields, &mut errors);

        let mut links = Vec::with_capacity(issue.links.len());
        for (i, link) in issue.links.iter().enumerate() {
            let link_type =
                errors.check(&format!("links[{i}].link_type"), require_non_empty(&link.link_type, "Link type"));
            let key = errors.check(&format!("links[{i}].issue_key"), validate_issue_key(&link.issue_key));
            if let (Some(link_type), Some(issue_key)) = (link_type, key) {
                links.push(NewLink {
                    link_type,
                    issue_key,
                    direction: link.direction,
                });
            }
        }
        errors.into_result()?;

        let mut fields = Map::new();
        fields.insert("project".into(), json!({ "key": project }));
        fields.insert("summary".into(), json!(summary));
        fields.insert("issuetype".into(), json!({ "name": issue_type }));
        if let Some(description) = &issue.description {
            fields.insert("description".into(), json!(description));
        }
        if let Some(priority) = non_blank(issue.priority.as_deref()) {
            fields.insert("priority".into(), json!({ "name": priority }));
        }
        if let Some(assignee) = non_blank(issue.assignee.as_deref()) {
            fields.insert("assignee".into(), json!({ "accountId": assignee }));
        }
        if !labels.is_empty() {
            fields.insert("labels".into(), json!(labels));
        }
        if !issue.components.is_empty() {
            fields.insert("components".into(), component_names(&issue.components));
        }
        if let Some(parent) = parent {
            fields.insert("parent".into(), json!({ "key": parent }));
        }
        for (key, value) in &issue.custom_fields {
            fields.insert(key.clone(), value.clone());
        }

        Ok(CreatePlan { fields, links })
    }

    /// Update fields of an issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the key is malformed or nothing is
    /// being changed, or the Jira error.
    pub async fn update_issue(&self, issue_key: &str, update: &IssueUpdate) -> Result<UpdatedIssue> {
        let (key, fields) = plan_update(issue_key, update)?;

        let mut updated_fields: Vec<String> = fields.keys().cloned().collect();
        updated_fields.sort();
        debug!(issue_key = %key, fields = ?updated_fields, "Updating issue");
        self.put_no_content(&["issue", &key], json!({ "fields": fields }))
            .await?;
        info!(issue_key = %key, "Updated issue");

        Ok(UpdatedIssue {
            url: self.browse_url(&key),
            issue_key: key,
            updated_fields,
        })
    }
}

fn plan_update(issue_key: &str, update: &IssueUpdate) -> Result<(String, Map<String, Value>)> {
    let mut errors = FieldErrors::new();
    let key = errors.check("issue_key", validate_issue_key(issue_key));
    let fields = update_fields(update, &mut errors);
    if errors.is_empty() && fields.is_empty() {
        errors.add("fields", "At least one field to update is required");
    }
    errors.into_result()?;
    Ok((key.unwrap_or_default(), fields))
}

fn update_fields(update: &IssueUpdate, errors: &mut FieldErrors) -> Map<String, Value> {
    let mut fields = Map::new();

    if let Some(summary) = &update.summary
        && let Some(summary) = errors.check("summary", validate_summary(summary))
    {
        fields.insert("summary".into(), json!(summary));
    }
    if let Some(description) = &update.description {
        fields.insert("description".into(), json!(description));
    }
    if let Some(priority) = &update.priority
        && let Some(priority) = errors.check("priority", require_non_empty(priority, "Priority"))
    {
        fields.insert("priority".into(), json!({ "name": priority }));
    }
    match &update.assignee {
        Some(Some(account_id)) => {
            if let Some(id) = errors.check("assignee", require_non_empty(account_id, "Assignee")) {
                fields.insert("assignee".into(), json!({ "accountId": id }));
            }
        }
        Some(None) => {
            fields.insert("assignee".into(), Value::Null);
        }
        None => {}
    }
    if let Some(labels) = &update.labels {
        let labels = check_labels(labels, errors);
        fields.insert("labels".into(), json!(labels));
    }
    if let Some(components) = &update.components {
        fields.insert("components".into(), component_names(components));
    }
    check_custom_fields(&update.custom_fields, errors);
    for (key, value) in &update.custom_fields {
        fields.insert(key.clone(), value.clone());
    }

    fields
}

pub(super) fn checked_key(issue_key: &str) -> Result<String> {
    let mut errors = FieldErrors::new();
    let key = errors.check("issue_key", validate_issue_key(issue_key));
    errors.into_result()?;
    Ok(key.unwrap_or_default())
}

fn check_labels(labels: &[String], errors: &mut FieldErrors) -> Vec<String> {
    labels
        .iter()
        .enumerate()
        .filter_map(|(i, label)| errors.check(&format!("labels[{i}]"), validate_label(label)))
        .collect()
}

fn component_names(components: &[String]) -> Value {
    components
        .iter()
        .map(|name| json!({ "name": name.trim() }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, JiraConfig};
    use jira_log::RequestLog;

    fn client(default_project: Option<&str>) -> JiraClient {
        let mut config = JiraConfig::new("https://acme.atlassian.net", "dev@acme.io", "t").unwrap();
        config.default_project = default_project.map(str::to_string);
        JiraClient::with_log(&config, RequestLog::disabled()).unwrap()
    }

    fn new_issue() -> NewIssue {
        NewIssue {
            summary: "Rotate TLS certs".into(),
            issue_type: "Task".into(),
            ..NewIssue::default()
        }
    }

    fn field_errors(result: Result<impl std::fmt::Debug>) -> FieldErrors {
        match result {
            Err(Error::Validation(fields)) => fields,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_uses_default_project() {
        let plan = client(Some("OPS")).plan_create(&new_issue()).unwrap();
        assert_eq!(plan.fields["project"], json!({"key": "OPS"}));
        assert_eq!(plan.fields["issuetype"], json!({"name": "Task"}));
        assert!(plan.fields.get("assignee").is_none());
    }

    #[test]
    fn test_blank_project_falls_back_to_default() {
        let mut issue = new_issue();
        issue.project_key = Some("   ".into());
        let plan = client(Some("OPS")).plan_create(&issue).unwrap();
        assert_eq!(plan.fields["project"], json!({"key": "OPS"}));

        let errors = field_errors(client(None).plan_create(&issue));
        assert!(errors.get("project_key").is_some());
    }

    #[test]
    fn test_validate_update_requires_a_field() {
        let errors = field_errors(client(None).validate_update("OPS-1", &IssueUpdate::default()));
        assert!(errors.get("fields").is_some());
        assert!(client(None)
            .validate_update("OPS-1", &IssueUpdate { assignee: Some(None), ..IssueUpdate::default() })
            .is_ok());
    }

    #[test]
    fn test_plan_maps_all_fields() {
        let mut issue = new_issue();
        issue.project_key = Some("web".into());
        issue.description = Some("Certs expire Friday".into());
        issue.priority = Some("High".into());
        issue.assignee = Some("5b10ac8d82e05b22cc7d4ef5".into());
        issue.labels = vec!["security".into()];
        issue.components = vec!["Edge".into()];
        issue.parent_key = Some("web-1".into());
        issue.custom_fields.insert("customfield_10010".into(), json!(3));

        let plan = client(Some("OPS")).plan_create(&issue).unwrap();
        assert_eq!(
            Value::Object(plan.fields),
            json!({
                "project": {"key": "WEB"},
                "summary": "Rotate TLS certs",
                "issuetype": {"name": "Task"},
                "description": "Certs expire Friday",
                "priority": {"name": "High"},
                "assignee": {"accountId": "5b10ac8d82e05b22cc7d4ef5"},
                "labels": ["security"],
                "components": [{"name": "Edge"}],
                "parent": {"key": "WEB-1"},
                "customfield_10010": 3
            })
        );
    }

    #[test]
    fn test_plan_reports_every_field() {
        let mut issue = NewIssue::default();
        issue.labels = vec!["two words".into()];
        issue.custom_fields.insert("severity".into(), json!("S1"));
        issue.links = vec![NewLink {
            link_type: " ".into(),
            issue_key: "nope".into(),
            direction: LinkDirection::Inward,
        }];

        let fields = field_errors(client(None).plan_create(&issue).map(|_| ()));
        for field in [
            "project_key",
            "summary",
            "issue_type",
            "labels[0]",
            "custom_fields.severity",
            "links[0].link_type",
            "links[0].issue_key",
        ] {
            assert!(fields.get(field).is_some(), "missing {field} in {fields}");
        }
    }

    #[test]
    fn test_link_sides() {
        let outward = NewLink {
            link_type: "Blocks".into(),
            issue_key: "OPS-3".into(),
            direction: LinkDirection::Outward,
        };
        assert_eq!(outward.sides("OPS-9"), ("OPS-3".into(), "OPS-9".into()));

        let inward = NewLink {
            direction: LinkDirection::Inward,
            ..outward
        };
        assert_eq!(inward.sides("OPS-9"), ("OPS-9".into(), "OPS-3".into()));
    }

    #[test]
    fn test_update_fields_unassign_and_replace() {
        let update = IssueUpdate {
            assignee: Some(None),
            labels: Some(vec![]),
            ..IssueUpdate::default()
        };
        let mut errors = FieldErrors::new();
        let fields = update_fields(&update, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(Value::Object(fields), json!({"assignee": null, "labels": []}));
    }

    #[test]
    fn test_update_fields_validation() {
        let update = IssueUpdate {
            summary: Some(" ".into()),
            assignee: Some(Some(String::new())),
            ..IssueUpdate::default()
        };
        let mut errors = FieldErrors::new();
        let fields = update_fields(&update, &mut errors);
        assert!(fields.is_empty());
        assert!(errors.get("summary").is_some());
        assert!(errors.get("assignee").is_some());
    }

    #[test]
    fn test_checked_key_normalizes() {
        assert_eq!(checked_key("ops-12").unwrap(), "OPS-12");
        assert!(field_errors(checked_key("")).get("issue_key").is_some());
    }
}
