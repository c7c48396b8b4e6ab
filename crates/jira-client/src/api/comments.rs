//! Issue comments.

use serde_json::json;
use tracing::info;

use super::DEFAULT_MAX_RESULTS;
use crate::client::JiraClient;
use crate::domain::raw::{RawComment, RawCommentPage};
use crate::domain::{Comment, CommentPage};
use crate::error::Result;
use crate::validation::{FieldErrors, require_non_empty, validate_issue_key, validate_max_results};

/// Paging for [`JiraClient::get_comments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentQuery {
    /// Index of the first comment.
    pub start_at: u32,
    /// Page size, 1 to 100.
    pub max_results: u32,
}

impl Default for CommentQuery {
    fn default() -> Self {
        Self {
            start_at: 0,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl JiraClient {
    /// Add a comment to an issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed key or blank body, or the
    /// Jira error.
    pub async fn add_comment(&self, issue_key: &str, body: &str) -> Result<Comment> {
        let mut errors = FieldErrors::new();
        let key = errors.check("issue_key", validate_issue_key(issue_key));
        let body = errors.check("body", require_non_empty(body, "Comment body"));
        errors.into_result()?;
        let key = key.unwrap_or_default();

        let comment = self.post_comment(&key, &body.unwrap_or_default()).await?;
        info!(issue_key = %key, comment_id = %comment.id, "Added comment");
        Ok(comment)
    }

    /// Post an already validated comment.
    pub(crate) async fn post_comment(&self, issue_key: &str, body: &str) -> Result<Comment> {
        let raw: RawComment = self
            .post(&["issue", issue_key, "comment"], json!({ "body": body }))
            .await?;
        Ok(raw.into())
    }

    /// List comments on an issue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the Jira error.
    pub async fn get_comments(&self, issue_key: &str, query: CommentQuery) -> Result<CommentPage> {
        let mut errors = FieldErrors::new();
        let key = errors.check("issue_key", validate_issue_key(issue_key));
        let max_results = errors.check("max_results", validate_max_results(query.max_results));
        errors.into_result()?;
        let key = key.unwrap_or_default();

        let params = [
            ("startAt", query.start_at.to_string()),
            (
                "maxResults",
                max_results.unwrap_or(DEFAULT_MAX_RESULTS).to_string(),
            ),
        ];
        let raw: RawCommentPage = self.get(&["issue", &key, "comment"], &params).await?;

        Ok(CommentPage {
            issue_key: key,
            total: raw.total,
            start_at: raw.start_at,
            max_results: raw.max_results,
            comments: raw.comments.into_iter().map(Comment::from).collect(),
        })
    }
}
