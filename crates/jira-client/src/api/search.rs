//! JQL search.

use tracing::debug;

use super::{DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_FIELDS};
use crate::client::JiraClient;
use crate::domain::raw::RawSearch;
use crate::domain::{IssueSummary, SearchResult};
use crate::error::Result;
use crate::validation::{FieldErrors, require_non_empty, validate_max_results};

/// A JQL search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// JQL expression.
    pub jql: String,
    /// Index of the first result.
    pub start_at: u32,
    /// Page size, 1..=100.
    pub max_results: u32,
    /// Fields to return; empty means [`DEFAULT_SEARCH_FIELDS`].
    pub fields: Vec<String>,
}

impl SearchQuery {
    /// First page of `jql` with default page size and fields.
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            start_at: 0,
            max_results: DEFAULT_MAX_RESULTS,
            fields: Vec::new(),
        }
    }

    /// Set the page.
    #[must_use]
    pub fn page(mut self, start_at: u32, max_results: u32) -> Self {
        self.start_at = start_at;
        self.max_results = max_results;
        self
    }

    /// Request specific fields.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and return the query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) for a blank
    /// JQL or an out-of-range page size.
    pub fn validate(&self) -> Result<Vec<(&'static str, String)>> {
        let mut errors = FieldErrors::new();
        let jql = errors.check("jql", require_non_empty(&self.jql, "JQL"));
        let max_results = errors.check("max_results", validate_max_results(self.max_results));
        errors.into_result()?;

        let fields: Vec<&str> = self
            .fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect();
        let fields = if fields.is_empty() {
            DEFAULT_SEARCH_FIELDS.join(",")
        } else {
            fields.join(",")
        };

        Ok(vec![
            ("jql", jql.unwrap_or_default()),
            ("startAt", self.start_at.to_string()),
            ("maxResults", max_results.unwrap_or(DEFAULT_MAX_RESULTS).to_string()),
            ("fields", fields),
        ])
    }
}

impl JiraClient {
    /// Run a JQL search.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the Jira error (a
    /// malformed JQL is a 400 [`ErrorKind::Validation`](crate::ErrorKind::Validation)).
    pub async fn search_issues(&self, query: &SearchQuery) -> Result<SearchResult> {
        let params = query.validate()?;
        debug!(jql = %query.jql, start_at = query.start_at, "Searching issues");

        let raw: RawSearch = self.get(&["search"], &params).await?;
        let issues = raw
            .issues
            .into_iter()
            .map(|issue| {
                let url = self.browse_url(&issue.key);
                IssueSummary::from_raw(issue, url)
            })
            .collect();

        Ok(SearchResult {
            total: raw.total,
            start_at: raw.start_at,
            max_results: raw.max_results,
            issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_default_params() {
        let params = SearchQuery::new("project = OPS").validate().unwrap();
        assert_eq!(
            params,
            vec![
                ("jql", "project = OPS".to_string()),
                ("startAt", "0".to_string()),
                ("maxResults", "50".to_string()),
                ("fields", "summary,status,issuetype,priority,assignee,updated".to_string()),
            ]
        );
    }

    #[test]
    fn test_custom_fields_and_page() {
        let params = SearchQuery::new(" status = Done ")
            .page(100, 25)
            .fields(["summary", " ", "labels"])
            .validate()
            .unwrap();
        assert_eq!(params[0].1, "status = Done");
        assert_eq!(params[1].1, "100");
        assert_eq!(params[2].1, "25");
        assert_eq!(params[3].1, "summary,labels");
    }

    #[test]
    fn test_collects_all_failures() {
        let err = SearchQuery::new("  ").page(0, 0).validate().unwrap_err();
        let Error::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert!(fields.get("jql").is_some());
        assert!(fields.get("max_results").is_some());
    }
}
