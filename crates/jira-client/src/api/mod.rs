//! Typed Jira operations.
//!
//! Each operation is an `impl JiraClient` method. Inputs are validated
//! locally first and every failure is reported together as
//! [`Error::Validation`](crate::Error::Validation) before any request is
//! sent.

mod comments;
mod issues;
mod links;
mod metadata;
mod search;
mod transitions;
mod users;

pub use comments::CommentQuery;
pub use issues::{IssueUpdate, LinkDirection, NewIssue, NewLink};
pub use links::LinkRequest;
pub use metadata::CreateFieldsQuery;
pub use search::SearchQuery;
pub use transitions::TransitionRequest;

use serde_json::{Map, Value};

use crate::client::JiraClient;
use crate::validation::{FieldErrors, validate_custom_field_key, validate_project_key};

/// Page size used when a caller does not choose one.
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Fields requested by searches that do not name their own.
pub const DEFAULT_SEARCH_FIELDS: &[&str] =
    &["summary", "status", "issuetype", "priority", "assignee", "updated"];

impl JiraClient {
    /// Explicit project key, else the configured default.
    ///
    /// Records a `project_key` failure when neither is usable.
    pub(crate) fn resolve_project(
        &self,
        explicit: Option<&str>,
        errors: &mut FieldErrors,
    ) -> Option<String> {
        match explicit.or(self.default_project()) {
            Some(key) => errors.check("project_key", validate_project_key(key)),
            None => {
                errors.add(
                    "project_key",
                    "Project key is required (no default project is configured)",
                );
                None
            }
        }
    }
}

/// Check `custom_fields` keys, recording failures under `custom_fields.<key>`.
pub(crate) fn check_custom_fields(fields: &Map<String, Value>, errors: &mut FieldErrors) {
    for key in fields.keys() {
        if let Err(message) = validate_custom_field_key(key) {
            errors.add(format!("custom_fields.{key}"), message);
        }
    }
}

/// Trim and drop blank entries.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
