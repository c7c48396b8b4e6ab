//! Workflow transitions.
//!
//! A transition with a comment is two independent calls: the transition
//! itself (never carrying the comment), then a plain add-comment. A
//! failed comment is reported in the outcome and does not undo the
//! transition.

use serde_json::{Map, Value, json};
use tracing::{info, warn};

use super::{check_custom_fields, non_blank};
use crate::client::JiraClient;
use crate::domain::raw::RawTransitions;
use crate::domain::{CommentOutcome, Transition, TransitionOutcome};
use crate::error::Result;
use crate::validation::{FieldErrors, validate_issue_key, validate_transition_id};

/// Input for [`JiraClient::transition_issue`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionRequest {
    /// Issue to transition.
    pub issue_key: String,
    /// Numeric transition id from [`JiraClient::get_transitions`].
    pub transition_id: String,
    /// Resolution name, e.g. `Done` or `Won't Do`.
    pub resolution: Option<String>,
    /// Comment to add after the transition succeeds.
    pub comment: Option<String>,
    /// Extra screen fields sent with the transition.
    pub fields: Map<String, Value>,
}

struct TransitionPlan {
    issue_key: String,
    transition_id: String,
    body: Value,
    comment: Option<String>,
}

impl TransitionRequest {
    fn plan(&self) -> Result<TransitionPlan> {
        let mut errors = FieldErrors::new();
        let issue_key = errors.check("issue_key", validate_issue_key(&self.issue_key));
        let transition_id =
            errors.check("transition_id", validate_transition_id(&self.transition_id));
        let custom: Map<String, Value> = self
            .fields
            .iter()
            .filter(|(key, _)| key.starts_with("customfield_"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        check_custom_fields(&custom, &mut errors);
        errors.into_result()?;
        let transition_id = transition_id.unwrap_or_default();

        let mut fields: Map<String, Value> = self
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != "comment")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if let Some(resolution) = non_blank(self.resolution.as_deref()) {
            fields.insert("resolution".into(), json!({ "name": resolution }));
        }

        let mut body = json!({ "transition": { "id": transition_id } });
        if !fields.is_empty() {
            body["fields"] = Value::Object(fields);
        }

        Ok(TransitionPlan {
            issue_key: issue_key.unwrap_or_default(),
            transition_id,
            body,
            comment: non_blank(self.comment.as_deref()),
        })
    }
}

impl JiraClient {
    /// Transitions available on an issue for the current user.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed key, or the Jira error.
    pub async fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        let key = super::issues::checked_key(issue_key)?;
        let raw: RawTransitions = self
            .get(
                &["issue", &key, "transitions"],
                &[("expand", "transitions.fields".to_string())],
            )
            .await?;
        Ok(raw.transitions.into_iter().map(Transition::from).collect())
    }

    /// Move an issue through its workflow, then add the comment if any.
    ///
    /// # Errors
    ///
    /// Returns an error only when validation or the transition call fails.
    /// Comment failures are reported in [`TransitionOutcome::comment`].
    pub async fn transition_issue(&self, request: &TransitionRequest) -> Result<TransitionOutcome> {
        let plan = request.plan()?;

        self.post_no_content(&["issue", &plan.issue_key, "transitions"], plan.body)
            .await?;
        info!(
            issue_key = %plan.issue_key,
            transition_id = %plan.transition_id,
            "Transitioned issue"
        );

        let comment = match plan.comment {
            None => CommentOutcome::default(),
            Some(body) => match self.post_comment(&plan.issue_key, &body).await {
                Ok(comment) => CommentOutcome {
                    added: true,
                    id: Some(comment.id),
                    error: None,
                },
                Err(e) => {
                    warn!(
                        issue_key = %plan.issue_key,
                        error = %e,
                        "Transition succeeded but the comment was not added"
                    );
                    let payload = e.to_payload();
                    CommentOutcome {
                        added: false,
                        id: None,
                        error: payload.get("error").cloned(),
                    }
                }
            },
        };

        Ok(TransitionOutcome {
            issue_key: plan.issue_key,
            transition_id: plan.transition_id,
            transitioned: true,
            comment,
        })
    }
}
