use crate::{
    config::GitLabConfig,
    gitlab::{GraphQLClient, RestClient},
    tools::ToolSet,
};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
};
use std::sync::Arc;

/// MCP server exposing the GitLab tools. Cheap to clone; every transport
/// session gets its own handle onto the same clients.
#[derive(Clone)]
pub struct GitLabService(Arc<ToolSet>);

impl GitLabService {
    pub fn new(config: &GitLabConfig) -> Self {
        let tools = ToolSet::new(
            RestClient::new(config.clone()),
            GraphQLClient::new(config.clone()),
        );
        Self(Arc::new(tools))
    }
}

impl ServerHandler for GitLabService {
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("got tools/call request for {}", request.name);
        let result = self.0.call(&request.name, request.arguments).await;
        if let Err(e) = &result {
            tracing::warn!("Tool {} failed: {}", request.name, e.message);
        }
        result
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: Some("GitLab MCP".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),

                ..Default::default()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Tools for GitLab issues, merge requests, pipelines, work item notes and search."
                    .to_string(),
            ),

            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        tracing::info!("got tools/list request {:?}", request);
        Ok(ListToolsResult::with_all_items(self.0.list()))
    }
}
