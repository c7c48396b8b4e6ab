//! Jira REST API v2 client.
//!
//! This crate provides both the `jira` CLI and a library used by the MCP
//! server. The library covers configuration loading, Basic-Auth, a logging
//! request helper with an error taxonomy, and typed issue operations.
//!
//! ```no_run
//! use jira_client::{JiraClient, JiraConfig};
//! use jira_client::api::SearchQuery;
//!
//! # async fn example() -> jira_client::Result<()> {
//! let config = JiraConfig::load(None).await?;
//! let client = JiraClient::connect(&config).await?;
//! let page = client.search_issues(&SearchQuery::new("assignee = currentUser()")).await?;
//! println!("{} open issues", page.total);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod validation;

// CLI support (needed by binary)
pub mod cli;
pub mod output;

pub use auth::{Credentials, basic_auth_header};
pub use client::JiraClient;
pub use config::{ConfigLayer, JiraConfig};
pub use error::{ApiError, Error, ErrorKind, Result};
pub use validation::FieldErrors;
