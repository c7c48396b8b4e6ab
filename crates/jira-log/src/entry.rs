//! Log entry formatting.
//!
//! Each entry renders to exactly one line:
//! `<RFC3339 UTC timestamp> <KIND> <fields...>`.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::redact::{redact_text, redact_url, redact_value};

/// A single record in the request log.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    /// An outgoing request, written before it is sent.
    Request {
        /// Correlates the request with its response or error.
        id: u64,
        /// HTTP method.
        method: String,
        /// Fully-qualified request URL.
        url: String,
        /// JSON body, if any.
        body: Option<Value>,
    },

    /// A response with any status code.
    Response {
        /// Id of the matching request.
        id: u64,
        /// HTTP status code.
        status: u16,
        /// Time between send and the body being read.
        elapsed: Duration,
        /// Response body. Non-JSON bodies are carried as a JSON string.
        body: Option<Value>,
    },

    /// The request failed before a response was received.
    Error {
        /// Id of the matching request.
        id: u64,
        /// Time until the failure.
        elapsed: Duration,
        /// Failure description.
        message: String,
    },
}

impl LogEntry {
    /// Build a request entry.
    pub fn request(
        id: u64,
        method: impl Into<String>,
        url: impl Into<String>,
        body: Option<Value>,
    ) -> Self {
        Self::Request {
            id,
            method: method.into(),
            url: url.into(),
            body,
        }
    }

    /// Build a response entry.
    #[must_use]
    pub fn response(id: u64, status: u16, elapsed: Duration, body: Option<Value>) -> Self {
        Self::Response {
            id,
            status,
            elapsed,
            body,
        }
    }

    /// Build an error entry.
    pub fn error(id: u64, elapsed: Duration, message: impl Into<String>) -> Self {
        Self::Error {
            id,
            elapsed,
            message: message.into(),
        }
    }

    /// The entry kind as it appears in the log.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Request { .. } => "REQUEST",
            Self::Response { .. } => "RESPONSE",
            Self::Error { .. } => "ERROR",
        }
    }

    /// Request id this entry belongs to.
    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            Self::Request { id, .. } | Self::Response { id, .. } | Self::Error { id, .. } => *id,
        }
    }

    /// Render the entry as a single redacted line, including the trailing newline.
    ///
    /// Bodies longer than `body_limit` characters are cut and suffixed with
    /// `...[truncated N chars]`.
    #[must_use]
    pub fn format_line(&self, timestamp: DateTime<Utc>, body_limit: usize) -> String {
        let ts = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        let fields = match self {
            Self::Request {
                id,
                method,
                url,
                body,
            } => format!(
                "id={id} method={method} url={} body={}",
                redact_url(url),
                render_body(body.as_ref(), body_limit)
            ),
            Self::Response {
                id,
                status,
                elapsed,
                body,
            } => format!(
                "id={id} status={status} elapsed_ms={} body={}",
                elapsed.as_millis(),
                render_body(body.as_ref(), body_limit)
            ),
            Self::Error {
                id,
                elapsed,
                message,
            } => format!(
                "id={id} elapsed_ms={} error={}",
                elapsed.as_millis(),
                escape_line(&redact_text(message))
            ),
        };
        format!("{ts} {} {fields}\n", self.kind())
    }
}

fn render_body(body: Option<&Value>, limit: usize) -> String {
    let Some(body) = body else {
        return "-".to_string();
    };
    // Compact JSON never contains raw newlines; escaping covers bare strings.
    let rendered = match redact_value(body) {
        Value::String(text) => escape_line(&text),
        other => other.to_string(),
    };
    truncate(&rendered, limit)
}

fn escape_line(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}

fn truncate(text: &str, limit: usize) -> String {
    let total = text.chars().count();
    if total <= limit {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit).collect();
    format!("{kept}...[truncated {} chars]", total - limit)
}
