//! Basic-Auth credentials for Jira Cloud and Server.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Email and API token pair.
///
/// The `Debug` output masks the token so credentials can be logged with
/// `?config` safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    api_token: String,
}

impl Credentials {
    /// Create credentials from an account email and API token.
    pub fn new(email: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_token: api_token.into(),
        }
    }

    /// Account email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        basic_auth_header(&self.email, &self.api_token)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_token", &"***")
            .finish()
    }
}

/// Build a `Basic` authorization header value from `email:token`.
///
/// Uses the standard base64 alphabet with padding.
#[must_use]
pub fn basic_auth_header(email: &str, token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{token}")))
}
