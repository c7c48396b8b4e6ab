//! Input validation for Jira operations.
//!
//! Validators return `Result<String, String>` with the normalized value so
//! they can double as clap `value_parser`s. Operation inputs collect every
//! failure into [`FieldErrors`] before any HTTP call is made.
//!
//! Explicit character checks are used instead of regexes so each failure
//! gets a specific message.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Maximum summary length accepted by Jira.
pub const MAX_SUMMARY_LENGTH: usize = 255;

/// Minimum project key length.
pub const MIN_PROJECT_KEY_LENGTH: usize = 2;

/// Maximum project key length.
pub const MAX_PROJECT_KEY_LENGTH: usize = 10;

/// Upper bound for `maxResults` on paged endpoints.
pub const MAX_RESULTS_LIMIT: u32 = 100;

/// Per-field validation failures, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. The first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Take every failure from `other`, keeping messages already recorded.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.add(field, message);
        }
    }

    /// Run a validator and keep its value, recording the failure under `field`.
    pub fn check<T>(&mut self, field: &str, result: std::result::Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    /// Whether no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Iterate over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when empty, otherwise [`Error::Validation`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] carrying these failures if any were recorded.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        f.write_str(&parts.join("; "))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (k, v) in iter {
            errors.add(k, v);
        }
        errors
    }
}

/// Validate an issue key (`OPS-42`) or numeric issue id (`10042`).
///
/// Keys are trimmed and upper-cased.
pub fn validate_issue_key(s: &str) -> std::result::Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Issue key cannot be empty".to_string());
    }

    if s.chars().all(|c| c.is_ascii_digit()) {
        return Ok(s.to_string());
    }

    let upper = s.to_ascii_uppercase();
    let Some((project, number)) = upper.rsplit_once('-') else {
        return Err(format!(
            "Invalid issue key '{s}'. Expected PROJECT-123 or a numeric issue id"
        ));
    };

    check_project_part(project).map_err(|e| format!("Invalid issue key '{s}': {e}"))?;

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!(
            "Invalid issue key '{s}': the part after '-' must be a number"
        ));
    }

    Ok(upper)
}

/// Validate a project key (`OPS`). Trimmed and upper-cased.
pub fn validate_project_key(s: &str) -> std::result::Result<String, String> {
    let upper = s.trim().to_ascii_uppercase();

    if upper.is_empty() {
        return Err("Project key cannot be empty".to_string());
    }

    if upper.len() < MIN_PROJECT_KEY_LENGTH || upper.len() > MAX_PROJECT_KEY_LENGTH {
        return Err(format!(
            "Project key must be {MIN_PROJECT_KEY_LENGTH}-{MAX_PROJECT_KEY_LENGTH} characters"
        ));
    }

    check_project_part(&upper)?;
    Ok(upper)
}

fn check_project_part(project: &str) -> std::result::Result<(), String> {
    let mut chars = project.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        Some(_) => return Err("project key must start with a letter".to_string()),
        None => return Err("project key is missing".to_string()),
    }
    if !chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_') {
        return Err("project key may contain only letters, digits and '_'".to_string());
    }
    Ok(())
}

/// Require a non-blank value. Returns the trimmed text.
pub fn require_non_empty(s: &str, what: &str) -> std::result::Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        Err(format!("{what} cannot be empty"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validate an issue summary.
pub fn validate_summary(s: &str) -> std::result::Result<String, String> {
    let trimmed = require_non_empty(s, "Summary")?;
    if trimmed.chars().count() > MAX_SUMMARY_LENGTH {
        return Err(format!(
            "Summary cannot exceed {MAX_SUMMARY_LENGTH} characters"
        ));
    }
    Ok(trimmed)
}

/// Validate a page size.
pub fn validate_max_results(n: u32) -> std::result::Result<u32, String> {
    if (1..=MAX_RESULTS_LIMIT).contains(&n) {
        Ok(n)
    } else {
        Err(format!("max_results must be between 1 and {MAX_RESULTS_LIMIT}"))
    }
}

/// Validate a workflow transition id (numeric string).
pub fn validate_transition_id(s: &str) -> std::result::Result<String, String> {
    let trimmed = require_non_empty(s, "Transition id")?;
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        Ok(trimmed)
    } else {
        Err(format!(
            "Transition id '{trimmed}' must be numeric (use get_transitions to list ids)"
        ))
    }
}

/// Validate a custom field key (`customfield_10010`).
pub fn validate_custom_field_key(s: &str) -> std::result::Result<String, String> {
    match s.strip_prefix("customfield_") {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            Ok(s.to_string())
        }
        _ => Err(format!(
            "'{s}' is not a custom field id (expected customfield_<number>)"
        )),
    }
}

/// Validate a label. Jira labels cannot contain whitespace.
pub fn validate_label(s: &str) -> std::result::Result<String, String> {
    let trimmed = require_non_empty(s, "Label")?;
    if trimmed.chars().any(char::is_whitespace) {
        return Err(format!("Label '{trimmed}' cannot contain spaces"));
    }
    Ok(trimmed)
}
