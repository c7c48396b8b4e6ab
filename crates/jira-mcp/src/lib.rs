//! MCP server for Jira.
//!
//! This crate provides an MCP (Model Context Protocol) server that exposes
//! Jira REST API v2 operations to AI assistants.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for MCP protocol handling and wraps a
//! [`jira_client::JiraClient`]. Input problems are reported as MCP
//! `invalid_params` errors; Jira failures come back as tool results flagged
//! as errors, carrying a structured payload with the error kind.
//!
//! # Tools
//!
//! ## Reading
//! - `get_current_user` - The authenticated user
//! - `search_issues` - JQL search
//! - `get_issue` - Full issue details
//! - `get_comments` - Comments on an issue
//! - `get_transitions` - Available workflow transitions
//!
//! ## Writing
//! - `create_issue` - Create an issue, optionally with links
//! - `update_issue` - Update issue fields
//! - `add_comment` - Comment on an issue
//! - `transition_issue` - Move an issue through its workflow
//! - `link_issues` - Link two issues
//!
//! ## Metadata
//! - `list_projects`, `list_issue_types`, `list_components`,
//!   `list_priorities`, `list_link_types`
//! - `get_create_fields` - Fields needed to create issues

pub mod cli;
pub mod error;
pub mod models;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::JiraMcpServer;
