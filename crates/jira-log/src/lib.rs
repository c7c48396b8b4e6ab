//! Append-only request log for Jira API traffic.
//!
//! Every outgoing request and every response (or transport failure) is
//! written as a single plaintext line. Secrets are redacted before a line
//! is formatted, so credentials never reach the file.
//!
//! ```text
//! 2026-01-05T10:12:44.120Z REQUEST id=1 method=POST url=https://acme.atlassian.net/rest/api/2/issue body={"fields":{...}}
//! 2026-01-05T10:12:44.391Z RESPONSE id=1 status=201 elapsed_ms=271 body={"id":"10001","key":"OPS-7"}
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod redact;
pub mod writer;

pub use entry::LogEntry;
pub use error::{Error, Result};
pub use redact::{REDACTED, redact_text, redact_url, redact_value};
pub use writer::{DEFAULT_BODY_LIMIT, RequestLog};
