//! Error types for Jira client operations.
//!
//! HTTP failures are classified by status code into an [`ErrorKind`], and
//! every error can be rendered as a structured JSON payload for callers
//! that surface errors to an assistant.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::validation::FieldErrors;

/// Longest non-JSON error body kept as a message.
const MAX_RAW_MESSAGE_CHARS: usize = 500;

/// Classification of a failed Jira response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 401: missing or wrong credentials.
    Authentication,
    /// 403: authenticated but not allowed.
    Permission,
    /// 404: issue, project or endpoint does not exist (or is hidden).
    NotFound,
    /// 409: conflicting concurrent change.
    Conflict,
    /// 400/422: Jira rejected the request content.
    Validation,
    /// 429: too many requests.
    RateLimit,
    /// Anything else, including 5xx.
    Api,
}

impl ErrorKind {
    /// Classify an HTTP status code.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => Self::Validation,
            401 => Self::Authentication,
            403 => Self::Permission,
            404 => Self::NotFound,
            409 => Self::Conflict,
            429 => Self::RateLimit,
            _ => Self::Api,
        }
    }

    /// Stable snake_case identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Permission => "permission",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::RateLimit => "rate_limit",
            Self::Api => "api",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Authentication => "Authentication failed",
            Self::Permission => "Permission denied",
            Self::NotFound => "Not found",
            Self::Conflict => "Conflict",
            Self::Validation => "Jira rejected the request",
            Self::RateLimit => "Rate limited",
            Self::Api => "Jira API error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-2xx response from Jira.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Classification derived from `status`.
    pub kind: ErrorKind,
    /// HTTP status code.
    pub status: u16,
    /// Entries of Jira's `errorMessages`, or the raw body.
    pub messages: Vec<String>,
    /// Entries of Jira's `errors` object (field -> message).
    pub field_errors: BTreeMap<String, String>,
    /// `Retry-After` for rate-limited responses.
    pub retry_after: Option<Duration>,
}

/// Jira's standard error body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct JiraErrorBody {
    error_messages: Vec<String>,
    errors: BTreeMap<String, Value>,
}

impl ApiError {
    /// Build an error from a response status and body text.
    ///
    /// Jira's `{"errorMessages": [...], "errors": {...}}` shape is parsed
    /// when present. Other bodies become a single (truncated) message, and
    /// an empty body becomes `HTTP <status> <reason>`.
    #[must_use]
    pub fn from_response(
        status: u16,
        reason: Option<&str>,
        body: &str,
        retry_after: Option<Duration>,
    ) -> Self {
        let mut messages = Vec::new();
        let mut field_errors = BTreeMap::new();

        match serde_json::from_str::<JiraErrorBody>(body) {
            Ok(parsed) if !parsed.error_messages.is_empty() || !parsed.errors.is_empty() => {
                messages = parsed.error_messages;
                field_errors = parsed
                    .errors
                    .into_iter()
                    .map(|(field, value)| {
                        let text = match value {
                            Value::String(s) => s,
                            other => other.to_string(),
                        };
                        (field, text)
                    })
                    .collect();
            }
            _ => {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    messages.push(match reason {
                        Some(reason) => format!("HTTP {status} {reason}"),
                        None => format!("HTTP {status}"),
                    });
                } else {
                    messages.push(truncate_chars(trimmed, MAX_RAW_MESSAGE_CHARS));
                }
            }
        }

        let kind = ErrorKind::from_status(status);
        Self {
            kind,
            status,
            messages,
            field_errors,
            retry_after: retry_after.filter(|_| kind == ErrorKind::RateLimit),
        }
    }

    /// Messages and field errors joined into one human-readable string.
    #[must_use]
    pub fn message(&self) -> String {
        let mut parts = self.messages.clone();
        parts.extend(
            self.field_errors
                .iter()
                .map(|(field, message)| format!("{field}: {message}")),
        );
        if parts.is_empty() {
            format!("HTTP {}", self.status)
        } else {
            parts.join("; ")
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (HTTP {}): {}",
            self.kind.describe(),
            self.status,
            self.message()
        )
    }
}

impl std::error::Error for ApiError {}

/// Errors that can occur in Jira client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Jira answered with a non-2xx status.
    #[error("{0}")]
    Api(ApiError),

    /// The request did not complete within the configured timeout.
    #[error("Request to {url} timed out")]
    Timeout {
        /// URL of the request.
        url: String,
    },

    /// Connection, TLS or protocol failure.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response did not have the expected shape.
    #[error("Unexpected response from {context}: {message}")]
    Decode {
        /// Operation that produced the response.
        context: String,
        /// Decoder message.
        message: String,
    },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input failed local validation; no request was sent.
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    /// URL construction failed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request log could not be opened.
    #[error("Request log error: {0}")]
    Log(#[from] jira_log::Error),
}

impl Error {
    /// Build a decode error.
    pub fn decode(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Build a single-field validation error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }

    /// Convert a reqwest failure, separating timeouts from other transport errors.
    #[must_use]
    pub fn from_reqwest(error: reqwest::Error, url: &str) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: jira_log::redact_url(url),
            }
        } else {
            Self::Transport(error.without_url())
        }
    }

    /// Stable snake_case identifier of the failure class.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Api(api) => api.kind.as_str(),
            Self::Timeout { .. } => "timeout",
            Self::Transport(_) => "transport",
            Self::Decode { .. } => "decode",
            Self::Config(_) | Self::Url(_) => "config",
            Self::Validation(_) => "validation",
            Self::Io(_) | Self::Log(_) => "io",
        }
    }

    /// HTTP status for API errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(api) => Some(api.status),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(api) if api.kind == ErrorKind::NotFound)
    }

    /// Check if this is an authentication error.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Api(api) if api.kind == ErrorKind::Authentication)
    }

    /// Check if this is a rate limit error.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api(api) if api.kind == ErrorKind::RateLimit)
    }

    /// Structured payload: `{"error": {"kind", "status"?, "message", ...}}`.
    ///
    /// Empty optional members are omitted.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut error = Map::new();
        error.insert("kind".into(), json!(self.kind()));
        if let Some(status) = self.status() {
            error.insert("status".into(), json!(status));
        }

        match self {
            Self::Api(api) => {
                error.insert("message".into(), json!(api.message()));
                if !api.messages.is_empty() {
                    error.insert("messages".into(), json!(api.messages));
                }
                if !api.field_errors.is_empty() {
                    error.insert("field_errors".into(), json!(api.field_errors));
                }
                if let Some(retry_after) = api.retry_after {
                    error.insert("retry_after_secs".into(), json!(retry_after.as_secs()));
                }
            }
            Self::Validation(fields) => {
                error.insert("message".into(), json!(self.to_string()));
                error.insert("field_errors".into(), json!(fields));
            }
            other => {
                error.insert(
                    "message".into(),
                    json!(jira_log::redact_text(&other.to_string())),
                );
            }
        }

        json!({ "error": Value::Object(error) })
    }
}

/// Result type for Jira client operations.
pub type Result<T> = std::result::Result<T, Error>;

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let kept: String = text.chars().take(limit).collect();
        format!("{kept}...")
    }
}
