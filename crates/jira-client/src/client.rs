//! HTTP request helper for the Jira REST API v2.
//!
//! [`JiraClient`] owns a configured `reqwest` client and the request log.
//! Every call is logged as a REQUEST line before it is sent and a RESPONSE
//! or ERROR line after, and non-2xx responses are classified into
//! [`ApiError`]s. Nothing is retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jira_log::{LogEntry, RequestLog, redact_url};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::JiraConfig;
use crate::error::{ApiError, Error, Result};

/// Path of the REST API below the site URL.
const API_PATH: &str = "rest/api/2/";

/// Jira REST client.
///
/// Cheap to clone; clones share the connection pool and the request log.
///
/// ```no_run
/// use jira_client::{JiraClient, JiraConfig};
///
/// # async fn example() -> jira_client::Result<()> {
/// let config = JiraConfig::new("https://acme.atlassian.net", "dev@acme.io", "token")?;
/// let client = JiraClient::connect(&config).await?;
/// let me = client.myself().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JiraClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    api_base: Url,
    default_project: Option<String>,
    log: RequestLog,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("default_project", &self.inner.default_project)
            .field("log", &self.inner.log)
            .finish_non_exhaustive()
    }
}

impl JiraClient {
    /// Build a client, opening the request log when `config.log_file` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened or the HTTP client
    /// cannot be built.
    pub async fn connect(config: &JiraConfig) -> Result<Self> {
        let log = match &config.log_file {
            Some(path) => RequestLog::open(path, config.log_body_limit).await?,
            None => RequestLog::disabled(),
        };
        Self::with_log(config, log)
    }

    /// Build a client writing to an already opened request log.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are not a valid header value or
    /// the HTTP client cannot be built.
    pub fn with_log(config: &JiraConfig, log: RequestLog) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&config.credentials.authorization_header())
            .map_err(|_| {
                Error::Config("credentials contain characters not allowed in a header".into())
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.strict_ssl)
            .user_agent(concat!("jira-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Transport)?;

        if !config.strict_ssl {
            warn!("TLS certificate verification is disabled");
        }

        let api_base = Url::parse(&format!(
            "{}/{API_PATH}",
            config.base_url.as_str().trim_end_matches('/')
        ))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.clone(),
                api_base,
                default_project: config.default_project.clone(),
                log,
            }),
        })
    }

    /// Site URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Project used when an operation omits one.
    #[must_use]
    pub fn default_project(&self) -> Option<&str> {
        self.inner.default_project.as_deref()
    }

    /// Browse URL for an issue key.
    #[must_use]
    pub fn browse_url(&self, issue_key: &str) -> String {
        format!(
            "{}/browse/{issue_key}",
            self.inner.base_url.as_str().trim_end_matches('/')
        )
    }

    /// The request log this client writes to.
    #[must_use]
    pub fn request_log(&self) -> &RequestLog {
        &self.inner.log
    }

    /// API URL for `segments` (each percent-encoded as one path segment)
    /// with `query` appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the site URL cannot carry a path.
    pub fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.inner.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("{} cannot be a base URL", self.inner.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(segments, query)?;
        let value = self.send(Method::GET, url, None).await?;
        decode(segments, value)
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: Value,
    ) -> Result<T> {
        let url = self.url(segments, &[])?;
        let value = self.send(Method::POST, url, Some(body)).await?;
        decode(segments, value)
    }

    pub(crate) async fn post_no_content(&self, segments: &[&str], body: Value) -> Result<()> {
        let url = self.url(segments, &[])?;
        self.send(Method::POST, url, Some(body)).await.map(drop)
    }

    pub(crate) async fn put_no_content(&self, segments: &[&str], body: Value) -> Result<()> {
        let url = self.url(segments, &[])?;
        self.send(Method::PUT, url, Some(body)).await.map(drop)
    }

    /// Send one request and return its JSON body.
    ///
    /// `Ok(None)` for 204 and empty bodies. Non-2xx statuses become
    /// [`Error::Api`].
    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<Option<Value>> {
        let log = &self.inner.log;
        let id = log.next_id();
        log.record(&LogEntry::request(id, method.as_str(), url.as_str(), body.clone()))
            .await;
        debug!(id, %method, url = %redact_url(url.as_str()), "Sending Jira request");

        let mut request = self.inner.http.request(method, url.clone());
        if let Some(body) = &body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.failed(id, started, Error::from_reqwest(e, url.as_str())).await),
        };

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.failed(id, started, Error::from_reqwest(e, url.as_str())).await),
        };
        let elapsed = started.elapsed();

        let parsed = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(&text))
        };
        let logged = parsed.as_ref().map(|p| match p {
            Ok(value) => value.clone(),
            Err(_) => Value::String(text.clone()),
        });
        log.record(&LogEntry::response(id, status.as_u16(), elapsed, logged))
            .await;

        if !status.is_success() {
            let error = ApiError::from_response(
                status.as_u16(),
                status.canonical_reason(),
                &text,
                retry_after,
            );
            warn!(
                id,
                status = status.as_u16(),
                kind = %error.kind,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "Jira request failed"
            );
            return Err(Error::Api(error));
        }

        debug!(id, status = status.as_u16(), "Jira request succeeded");

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        match parsed {
            None => Ok(None),
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(e)) => Err(Error::decode(url.path(), e)),
        }
    }

    async fn failed(&self, id: u64, started: Instant, error: Error) -> Error {
        let elapsed = started.elapsed();
        self.inner
            .log
            .record(&LogEntry::error(id, elapsed, error.to_string()))
            .await;
        warn!(id, error = %error, "Jira request did not complete");
        error
    }
}

fn decode<T: DeserializeOwned>(segments: &[&str], value: Option<Value>) -> Result<T> {
    let context = segments.join("/");
    let value = value.ok_or_else(|| Error::decode(&context, "empty response body"))?;
    serde_json::from_value(value).map_err(|e| Error::decode(context, e))
}

/// `Retry-After` in delta-seconds form. HTTP dates are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
