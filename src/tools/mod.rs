//! GitLab operations exposed as MCP tools.
//!
//! Each submodule owns the tools of one GitLab area: their names, typed
//! inputs, advertised schemas and handlers. [`ToolSet`] routes a call by
//! name to the matching handler.

mod issues;
mod merge_requests;
mod pipelines;
mod search;
mod server_info;
mod work_items;

use crate::gitlab::{GraphQLClient, RestClient};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content, JsonObject, Tool},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

pub struct ToolSet {
    rest: RestClient,
    graphql: GraphQLClient,
}

impl ToolSet {
    pub fn new(rest: RestClient, graphql: GraphQLClient) -> Self {
        Self { rest, graphql }
    }

    pub fn list(&self) -> Vec<Tool> {
        let mut tools = server_info::tools();
        tools.extend(issues::tools());
        tools.extend(merge_requests::tools());
        tools.extend(pipelines::tools());
        tools.extend(work_items::tools());
        tools.extend(search::tools());
        tools
    }

    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let rest = &self.rest;
        let graphql = &self.graphql;
        match name {
            server_info::GET_MCP_SERVER_VERSION => server_info::get_version(),

            issues::CREATE_ISSUE => issues::create_issue(rest, parse_input(arguments)?).await,
            issues::GET_ISSUE => issues::get_issue(rest, parse_input(arguments)?).await,

            merge_requests::CREATE_MERGE_REQUEST => {
                merge_requests::create(rest, parse_input(arguments)?).await
            }
            merge_requests::GET_MERGE_REQUEST => {
                merge_requests::get(rest, parse_input(arguments)?).await
            }
            merge_requests::GET_MERGE_REQUEST_COMMITS => {
                merge_requests::commits(rest, parse_input(arguments)?).await
            }
            merge_requests::GET_MERGE_REQUEST_DIFFS => {
                merge_requests::diffs(rest, parse_input(arguments)?).await
            }
            merge_requests::GET_MERGE_REQUEST_PIPELINES => {
                merge_requests::pipelines(rest, parse_input(arguments)?).await
            }

            pipelines::GET_PIPELINE_JOBS => pipelines::jobs(rest, parse_input(arguments)?).await,
            pipelines::MANAGE_PIPELINE => pipelines::manage(rest, parse_input(arguments)?).await,

            work_items::CREATE_WORKITEM_NOTE => {
                work_items::create_note(graphql, parse_input(arguments)?).await
            }
            work_items::GET_WORKITEM_NOTES => {
                work_items::notes(graphql, parse_input(arguments)?).await
            }

            search::SEARCH => search::search(rest, parse_input(arguments)?).await,
            search::SEARCH_LABELS => search::labels(rest, parse_input(arguments)?).await,
            search::SEMANTIC_CODE_SEARCH => {
                search::semantic_code(graphql, parse_input(arguments)?).await
            }

            _ => Err(McpError::invalid_params(format!("Unknown tool: {name}"), None)),
        }
    }
}

fn parse_input<T: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<T, McpError> {
    serde_json::from_value(Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| McpError::invalid_params(format!("Invalid input: {e}"), None))
}

/// Wraps a JSON result as the single text item of a successful call.
fn json_result(value: &impl Serialize) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize result: {e}"), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::GitLabConfig;
    use rmcp::model::RawContent;

    pub fn tool_set(server: &mockito::Server) -> ToolSet {
        let config = GitLabConfig::new(&server.url(), "test-token");
        ToolSet::new(RestClient::new(config.clone()), GraphQLClient::new(config))
    }

    pub fn args(value: Value) -> Option<JsonObject> {
        match value {
            Value::Object(map) => Some(map),
            _ => panic!("tool arguments must be an object"),
        }
    }

    /// Parses the text payload of a successful call back into JSON.
    pub fn result_json(result: &CallToolResult) -> Value {
        assert_ne!(result.is_error, Some(true));
        match &result.content[0].raw {
            RawContent::Text(text) => serde_json::from_str(&text.text).unwrap(),
            other => panic!("unexpected content {other:?}"),
        }
    }
}
