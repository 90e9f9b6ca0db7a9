use super::json_result;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Serialize;

pub const GET_MCP_SERVER_VERSION: &str = "get_mcp_server_version";

/// Takes no arguments.
#[derive(JsonSchema)]
pub struct VersionInput {}

#[derive(Debug, Serialize)]
struct ServerVersion {
    version: &'static str,
    name: &'static str,
}

pub fn tools() -> Vec<Tool> {
    vec![Tool::new(
        GET_MCP_SERVER_VERSION,
        "Return the version of this GitLab MCP server",
        crate::schema_from_type!(VersionInput),
    )]
}

pub fn get_version() -> Result<CallToolResult, McpError> {
    json_result(&ServerVersion {
        version: env!("CARGO_PKG_VERSION"),
        name: env!("CARGO_PKG_NAME"),
    })
}
