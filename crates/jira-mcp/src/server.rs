//! MCP server implementation.
//!
//! This module contains the main server setup using rmcp.

use crate::error::Error;
use crate::models::{
    AddCommentParams, CreateIssueParams, GetCommentsParams, GetCreateFieldsParams,
    GetIssueParams, GetTransitionsParams, LinkIssuesParams, ProjectParams, SearchIssuesParams,
    TransitionIssueParams, UpdateIssueParams,
};
use crate::tools::Tools;
use jira_client::JiraClient;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::{
    ErrorData as McpError, ServiceExt, handler::server::ServerHandler, tool, tool_handler,
    tool_router,
};
use serde::Serialize;
use std::sync::Arc;

/// Turn a tool outcome into an MCP response.
fn respond<T: Serialize>(result: crate::error::Result<T>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => Ok(CallToolResult::success(vec![Content::json(value)?])),
        Err(e) => e.into_call_result(),
    }
}

/// The Jira MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct JiraMcpServer {
    /// Tool implementations.
    tools: Arc<Tools>,
    /// Tool router for MCP dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl JiraMcpServer {
    /// Show the authenticated Jira user.
    #[tool(
        description = "Show the Jira user the server is authenticated as. Useful for checking connectivity and credentials."
    )]
    async fn get_current_user(&self) -> Result<CallToolResult, McpError> {
        respond(self.tools.get_current_user().await)
    }

    /// Search issues with JQL.
    #[tool(
        description = "Search issues with a JQL query. Returns one page of issue summaries and the total match count."
    )]
    async fn search_issues(
        &self,
        Parameters(params): Parameters<SearchIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.search_issues(params).await)
    }

    /// Fetch one issue.
    #[tool(
        description = "Get full details of an issue: fields, links, subtasks and custom field values."
    )]
    async fn get_issue(
        &self,
        Parameters(params): Parameters<GetIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.get_issue(params).await)
    }

    /// Create an issue.
    #[tool(
        description = "Create an issue. Optionally links it to existing issues once created. Use get_create_fields to discover required fields."
    )]
    async fn create_issue(
        &self,
        Parameters(params): Parameters<CreateIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.create_issue(params).await)
    }

    /// Update an issue.
    #[tool(
        description = "Update fields of an existing issue. Only the given fields change; labels and components are replaced."
    )]
    async fn update_issue(
        &self,
        Parameters(params): Parameters<UpdateIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.update_issue(params).await)
    }

    /// Comment on an issue.
    #[tool(description = "Add a comment to an issue.")]
    async fn add_comment(
        &self,
        Parameters(params): Parameters<AddCommentParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.add_comment(params).await)
    }

    /// Read the comments of an issue.
    #[tool(description = "List the comments on an issue, oldest first, one page at a time.")]
    async fn get_comments(
        &self,
        Parameters(params): Parameters<GetCommentsParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.get_comments(params).await)
    }

    /// List available transitions.
    #[tool(
        description = "List the workflow transitions currently available for an issue, with target status and required fields."
    )]
    async fn get_transitions(
        &self,
        Parameters(params): Parameters<GetTransitionsParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.get_transitions(&params.issue_key).await)
    }

    /// Transition an issue.
    #[tool(
        description = "Move an issue through a workflow transition, optionally setting a resolution. A comment, if given, is added after the transition succeeds and its outcome is reported separately."
    )]
    async fn transition_issue(
        &self,
        Parameters(params): Parameters<TransitionIssueParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.transition_issue(params).await)
    }

    /// Link two issues.
    #[tool(
        description = "Link two existing issues with a link type such as Blocks or Relates. Use list_link_types for the names."
    )]
    async fn link_issues(
        &self,
        Parameters(params): Parameters<LinkIssuesParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.link_issues(params).await)
    }

    /// List projects.
    #[tool(description = "List the projects visible to the authenticated user.")]
    async fn list_projects(&self) -> Result<CallToolResult, McpError> {
        respond(self.tools.list_projects().await)
    }

    /// List issue types.
    #[tool(
        description = "List issue types for a project, or for the whole site when no project is given or configured."
    )]
    async fn list_issue_types(
        &self,
        Parameters(params): Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.list_issue_types(params.project_key.as_deref()).await)
    }

    /// List components.
    #[tool(description = "List the components of a project.")]
    async fn list_components(
        &self,
        Parameters(params): Parameters<ProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.list_components(params.project_key.as_deref()).await)
    }

    /// List priorities.
    #[tool(description = "List the issue priorities defined on the site.")]
    async fn list_priorities(&self) -> Result<CallToolResult, McpError> {
        respond(self.tools.list_priorities().await)
    }

    /// List link types.
    #[tool(description = "List issue link types with their inward and outward descriptions.")]
    async fn list_link_types(&self) -> Result<CallToolResult, McpError> {
        respond(self.tools.list_link_types().await)
    }

    /// Describe create fields.
    #[tool(
        description = "Describe the fields for creating issues in a project: which are required, their types and allowed values."
    )]
    async fn get_create_fields(
        &self,
        Parameters(params): Parameters<GetCreateFieldsParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.tools.get_create_fields(params).await)
    }
}

impl JiraMcpServer {
    /// Create a server backed by the given client.
    #[must_use]
    pub fn new(client: JiraClient) -> Self {
        Self {
            tools: Arc::new(Tools::new(client)),
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the tools.
    #[must_use]
    pub fn tools(&self) -> &Arc<Tools> {
        &self.tools
    }

    /// Serve over stdio until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if the MCP handshake or the transport fails.
    pub async fn run(self) -> crate::error::Result<()> {
        let service = self
            .serve(stdio())
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;
        let reason = service
            .waiting()
            .await
            .map_err(|e| Error::Mcp(e.to_string()))?;
        tracing::info!(?reason, "MCP session ended");
        Ok(())
    }

    fn instructions(&self) -> String {
        let mut text = String::from(
            "Jira MCP server for Jira REST API v2. Search with JQL, read and edit issues, \
             move them through workflow transitions, and look up projects and field metadata.",
        );
        if let Some(project) = self.tools.client().default_project() {
            text.push_str(&format!(
                " The default project is {project}; tools that take project_key use it when omitted."
            ));
        }
        text
    }
}

#[tool_handler]
impl ServerHandler for JiraMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "jira-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(self.instructions()),
        }
    }
}
