//! Secret redaction for logged payloads.
//!
//! Three entry points cover what reaches the log file: JSON bodies
//! ([`redact_value`]), free text such as error messages ([`redact_text`]),
//! and request URLs ([`redact_url`]).

use serde_json::{Map, Value};

/// Replacement written in place of a secret.
pub const REDACTED: &str = "[REDACTED]";

/// Key fragments that mark a JSON member or query parameter as sensitive.
///
/// Matched against the lower-cased key with `_` and `-` removed, so
/// `api_token`, `apiToken` and `X-Api-Token` all match `token`.
const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "password",
    "token",
    "secret",
    "authorization",
    "apikey",
    "cookie",
    "credential",
];

/// Authorization schemes whose credential follows a single space.
const AUTH_SCHEMES: &[&str] = &["basic ", "bearer "];

/// Credentials shorter than this are assumed to be ordinary prose
/// ("a basic test") rather than an encoded secret, unless they follow an
/// `Authorization:` header name.
const MIN_CREDENTIAL_LEN: usize = 8;

/// Returns true if a JSON key or query parameter name holds a secret.
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    let normalized: String = key
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    SENSITIVE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| normalized.contains(fragment))
}

/// Returns a copy of `value` with every sensitive member replaced by
/// [`REDACTED`].
///
/// Objects and arrays are walked recursively. Key sets and array lengths
/// are preserved; only the values of sensitive keys change. String values
/// are passed through [`redact_text`] so inline `Basic`/`Bearer` credentials
/// are masked as well.
#[must_use]
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let redacted: Map<String, Value> = map
                .iter()
                .map(|(key, inner)| {
                    let replacement = if is_sensitive_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_value(inner)
                    };
                    (key.clone(), replacement)
                })
                .collect();
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        Value::String(text) => Value::String(redact_text(text)),
        other => other.clone(),
    }
}

/// Masks `Basic <credential>` and `Bearer <credential>` sequences in text.
///
/// Scheme matching is case-insensitive. Credential-shaped runs (base64/token
/// alphabet) of at least eight characters are replaced, so prose containing
/// the word "basic" is left alone. After an `Authorization:` header name any
/// credential is replaced.
#[must_use]
pub fn redact_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some((start, scheme_len)) = find_auth_scheme(rest) {
        let (head, tail) = rest.split_at(start + scheme_len);
        out.push_str(head);

        let credential_len = tail
            .char_indices()
            .find(|(_, c)| !is_credential_char(*c))
            .map_or(tail.len(), |(idx, _)| idx);

        let masked = credential_len >= MIN_CREDENTIAL_LEN
            || (credential_len > 0 && after_authorization(&head[..start]));
        if masked {
            out.push_str(REDACTED);
        } else {
            out.push_str(&tail[..credential_len]);
        }
        rest = &tail[credential_len..];
    }

    out.push_str(rest);
    out
}

/// Masks the values of sensitive query parameters in a URL.
///
/// The URL is treated as text: everything before `?` is kept, and each
/// `name=value` pair whose name is sensitive gets its value replaced.
#[must_use]
pub fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let (query, fragment) = match query.split_once('#') {
        Some((q, f)) => (q, Some(f)),
        None => (query, None),
    };

    let pairs: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if is_sensitive_key(name) => format!("{name}={REDACTED}"),
            _ => pair.to_string(),
        })
        .collect();

    let mut redacted = format!("{base}?{}", pairs.join("&"));
    if let Some(fragment) = fragment {
        redacted.push('#');
        redacted.push_str(fragment);
    }
    redacted
}

/// True when `prefix` ends with an `Authorization:` header name.
fn after_authorization(prefix: &str) -> bool {
    prefix
        .trim_end()
        .to_ascii_lowercase()
        .ends_with("authorization:")
}

fn find_auth_scheme(text: &str) -> Option<(usize, usize)> {
    // ASCII lower-casing keeps byte offsets stable.
    let lower = text.to_ascii_lowercase();
    AUTH_SCHEMES
        .iter()
        .filter_map(|scheme| {
            lower
                .match_indices(scheme)
                .find(|(idx, _)| *idx == 0 || !lower.as_bytes()[idx - 1].is_ascii_alphanumeric())
                .map(|(idx, _)| (idx, scheme.len()))
        })
        .min_by_key(|(idx, _)| *idx)
}

fn is_credential_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '-' | '_' | '.' | '~')
}
