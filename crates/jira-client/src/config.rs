//! Configuration loading.
//!
//! Settings are layered, lowest precedence first: built-in defaults, an
//! optional YAML file, environment variables, then command-line overrides.
//! Each source is read into a [`ConfigLayer`] of optional values; layers are
//! merged and finally resolved into a validated [`JiraConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::validation::validate_project_key;

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default maximum number of body characters per request log entry.
pub const DEFAULT_LOG_BODY_LIMIT: usize = jira_log::DEFAULT_BODY_LIMIT;

/// Environment variable names.
pub mod env_vars {
    /// Jira site URL, e.g. `https://acme.atlassian.net`.
    pub const BASE_URL: &str = "JIRA_BASE_URL";
    /// Account email used for Basic-Auth.
    pub const USER_EMAIL: &str = "JIRA_USER_EMAIL";
    /// Alias for [`USER_EMAIL`].
    pub const EMAIL: &str = "JIRA_EMAIL";
    /// API token used for Basic-Auth.
    pub const API_TOKEN: &str = "JIRA_API_TOKEN";
    /// Request log file path.
    pub const LOG_FILE: &str = "JIRA_LOG_FILE";
    /// Project used when an operation omits one.
    pub const DEFAULT_PROJECT: &str = "JIRA_DEFAULT_PROJECT";
    /// Per-request timeout in milliseconds.
    pub const TIMEOUT_MS: &str = "JIRA_TIMEOUT_MS";
    /// Set to `false` to accept invalid TLS certificates.
    pub const STRICT_SSL: &str = "JIRA_STRICT_SSL";
    /// Maximum body characters per request log entry.
    pub const LOG_BODY_LIMIT: &str = "JIRA_LOG_BODY_LIMIT";
}

/// One configuration source. Every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    /// Jira site URL.
    pub base_url: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// API token.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Request log file.
    pub log_file: Option<PathBuf>,
    /// Default project key.
    pub default_project: Option<String>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Whether TLS certificates are verified.
    pub strict_ssl: Option<bool>,
    /// Maximum body characters per log entry.
    pub log_body_limit: Option<usize>,
}

impl ConfigLayer {
    /// Load a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML for
    /// this structure (unknown keys are rejected).
    pub async fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config file {}: {e}", path.display())))
    }

    /// Read the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable if a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read variables through `lookup`, which returns `None` for unset names.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable if a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            base_url: get(env_vars::BASE_URL),
            email: get(env_vars::USER_EMAIL).or_else(|| get(env_vars::EMAIL)),
            api_token: get(env_vars::API_TOKEN),
            log_file: get(env_vars::LOG_FILE).map(PathBuf::from),
            default_project: get(env_vars::DEFAULT_PROJECT),
            timeout_ms: get(env_vars::TIMEOUT_MS)
                .map(|v| parse_number(env_vars::TIMEOUT_MS, &v))
                .transpose()?,
            strict_ssl: get(env_vars::STRICT_SSL)
                .map(|v| parse_bool(env_vars::STRICT_SSL, &v))
                .transpose()?,
            log_body_limit: get(env_vars::LOG_BODY_LIMIT)
                .map(|v| parse_number(env_vars::LOG_BODY_LIMIT, &v))
                .transpose()?,
        })
    }

    /// Overlay `higher` on top of `self`; values set in `higher` win.
    #[must_use]
    pub fn merge(self, higher: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            base_url: higher.base_url.or(self.base_url),
            email: higher.email.or(self.email),
            api_token: higher.api_token.or(self.api_token),
            log_file: higher.log_file.or(self.log_file),
            default_project: higher.default_project.or(self.default_project),
            timeout_ms: higher.timeout_ms.or(self.timeout_ms),
            strict_ssl: higher.strict_ssl.or(self.strict_ssl),
            log_body_limit: higher.log_body_limit.or(self.log_body_limit),
        }
    }

    /// Validate and apply defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the missing or invalid setting.
    pub fn resolve(self) -> Result<JiraConfig> {
        let base_url = self
            .base_url
            .ok_or_else(|| missing(env_vars::BASE_URL, "the Jira site URL"))?;
        let base_url = normalize_base_url(&base_url)?;

        let email = self
            .email
            .ok_or_else(|| missing(env_vars::USER_EMAIL, "the Jira account email"))?;
        let api_token = self
            .api_token
            .ok_or_else(|| missing(env_vars::API_TOKEN, "a Jira API token"))?;

        let default_project = self
            .default_project
            .map(|key| {
                validate_project_key(&key).map_err(|e| {
                    Error::Config(format!("{} is invalid: {e}", env_vars::DEFAULT_PROJECT))
                })
            })
            .transpose()?;

        let timeout_ms = self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(Error::Config(format!(
                "{} must be greater than zero",
                env_vars::TIMEOUT_MS
            )));
        }

        Ok(JiraConfig {
            base_url,
            credentials: Credentials::new(email.trim(), api_token.trim()),
            log_file: self.log_file,
            default_project,
            timeout: Duration::from_millis(timeout_ms),
            strict_ssl: self.strict_ssl.unwrap_or(true),
            log_body_limit: self.log_body_limit.unwrap_or(DEFAULT_LOG_BODY_LIMIT),
        })
    }
}

/// Validated client configuration.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Site URL without a trailing slash.
    pub base_url: Url,
    /// Basic-Auth credentials.
    pub credentials: Credentials,
    /// Request log file; logging is disabled when `None`.
    pub log_file: Option<PathBuf>,
    /// Project used when an operation omits one.
    pub default_project: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Whether TLS certificates are verified.
    pub strict_ssl: bool,
    /// Maximum body characters per log entry.
    pub log_body_limit: usize,
}

impl JiraConfig {
    /// Configuration with defaults for everything but the required values.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str, email: &str, api_token: &str) -> Result<Self> {
        ConfigLayer {
            base_url: Some(base_url.to_string()),
            email: Some(email.to_string()),
            api_token: Some(api_token.to_string()),
            ..ConfigLayer::default()
        }
        .resolve()
    }

    /// Load from an optional YAML file overlaid with the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the merged result is invalid.
    pub async fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with_overrides(config_file, ConfigLayer::default()).await
    }

    /// Like [`load`](Self::load), with command-line overrides on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the merged result is invalid.
    pub async fn load_with_overrides(
        config_file: Option<&Path>,
        overrides: ConfigLayer,
    ) -> Result<Self> {
        let file = match config_file {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                ConfigLayer::load_file(path).await?
            }
            None => ConfigLayer::default(),
        };
        file.merge(ConfigLayer::from_env()?)
            .merge(overrides)
            .resolve()
    }
}

fn missing(var: &str, what: &str) -> Error {
    Error::Config(format!("{var} must be set to {what}"))
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("{} is not a valid URL: {e}", env_vars::BASE_URL)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::Config(format!(
            "{} must use http or https, got '{}'",
            env_vars::BASE_URL,
            url.scheme()
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::Config(format!(
            "{} must not contain a query or fragment",
            env_vars::BASE_URL
        )));
    }
    Ok(url)
}

fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!(
            "{var} must be true or false, got '{other}'"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{var} must be a whole number, got '{value}'")))
}
