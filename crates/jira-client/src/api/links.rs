//! Issue links.

use serde_json::json;
use tracing::info;

use super::non_blank;
use crate::client::JiraClient;
use crate::domain::raw::RawLinkTypes;
use crate::domain::{IssueLinkType, LinkSummary};
use crate::error::Result;
use crate::validation::{FieldErrors, require_non_empty, validate_issue_key};

/// Input for [`JiraClient::link_issues`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRequest {
    /// Link type name, e.g. `Blocks`.
    pub link_type: String,
    /// Issue on the inward side ("is blocked by").
    pub inward_issue: String,
    /// Issue on the outward side ("blocks").
    pub outward_issue: String,
    /// Optional comment added to the inward issue.
    pub comment: Option<String>,
}

impl JiraClient {
    /// Link two existing issues.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the Jira error.
    pub async fn link_issues(&self, request: &LinkRequest) -> Result<LinkSummary> {
        let mut errors = FieldErrors::new();
        let link_type = errors.check("link_type", require_non_empty(&request.link_type, "Link type"));
        let inward = errors.check("inward_issue", validate_issue_key(&request.inward_issue));
        let outward = errors.check("outward_issue", validate_issue_key(&request.outward_issue));
        errors.into_result()?;

        let summary = LinkSummary {
            link_type: link_type.unwrap_or_default(),
            inward_issue: inward.unwrap_or_default(),
            outward_issue: outward.unwrap_or_default(),
        };
        self.create_link(
            &summary.link_type,
            &summary.inward_issue,
            &summary.outward_issue,
            non_blank(request.comment.as_deref()).as_deref(),
        )
        .await?;
        Ok(summary)
    }

    /// `POST issueLink` with already validated keys.
    pub(crate) async fn create_link(
        &self,
        link_type: &str,
        inward: &str,
        outward: &str,
        comment: Option<&str>,
    ) -> Result<()> {
        let mut body = json!({
            "type": { "name": link_type },
            "inwardIssue": { "key": inward },
            "outwardIssue": { "key": outward },
        });
        if let Some(comment) = comment {
            body["comment"] = json!({ "body": comment });
        }
        self.post_no_content(&["issueLink"], body).await?;
        info!(link_type, inward, outward, "Linked issues");
        Ok(())
    }

    /// Link types defined on the site.
    ///
    /// # Errors
    ///
    /// Returns the Jira error if the request fails.
    pub async fn list_link_types(&self) -> Result<Vec<IssueLinkType>> {
        let raw: RawLinkTypes = self.get(&["issueLinkType"], &[]).await?;
        Ok(raw
            .issue_link_types
            .into_iter()
            .map(IssueLinkType::from)
            .collect())
    }
}
