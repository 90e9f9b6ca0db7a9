use super::json_result;
use crate::gitlab::{Query, ResourceId, RestClient};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CREATE_MERGE_REQUEST: &str = "create_merge_request";
pub const GET_MERGE_REQUEST: &str = "get_merge_request";
pub const GET_MERGE_REQUEST_COMMITS: &str = "get_merge_request_commits";
pub const GET_MERGE_REQUEST_DIFFS: &str = "get_merge_request_diffs";
pub const GET_MERGE_REQUEST_PIPELINES: &str = "get_merge_request_pipelines";

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CreateMergeRequestInput {
    /// Project ID or URL-encodable `namespace/project` path
    #[serde(skip_serializing)]
    project_id: ResourceId,
    /// Merge request title
    title: String,
    /// Branch holding the changes
    source_branch: String,
    /// Branch to merge into
    target_branch: String,
    /// Merge request description, Markdown supported
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// IDs of the users to assign
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee_ids: Option<Vec<u64>>,
    /// Comma-separated label names
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<String>,
    /// Milestone ID
    #[serde(skip_serializing_if = "Option::is_none")]
    milestone_id: Option<u64>,
    /// Delete the source branch once merged
    #[serde(skip_serializing_if = "Option::is_none")]
    remove_source_branch: Option<bool>,
    /// Squash commits when merging
    #[serde(skip_serializing_if = "Option::is_none")]
    squash: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MergeRequestInput {
    /// Project ID or URL-encodable `namespace/project` path
    project_id: ResourceId,
    /// Project-scoped merge request IID
    mr_iid: u64,
}

impl MergeRequestInput {
    fn path(&self, suffix: &str) -> String {
        format!(
            "/projects/{}/merge_requests/{}{suffix}",
            self.project_id.encoded(),
            self.mr_iid
        )
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MergeRequestDiffsInput {
    #[serde(flatten)]
    merge_request: MergeRequestInput,
    /// Return the diffs in unified diff format
    unidiff: Option<bool>,
}

pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            CREATE_MERGE_REQUEST,
            "Create a new merge request in a GitLab project",
            crate::schema_from_type!(CreateMergeRequestInput),
        ),
        Tool::new(
            GET_MERGE_REQUEST,
            "Get the details of a single merge request",
            crate::schema_from_type!(MergeRequestInput),
        ),
        Tool::new(
            GET_MERGE_REQUEST_COMMITS,
            "List the commits of a merge request",
            crate::schema_from_type!(MergeRequestInput),
        ),
        Tool::new(
            GET_MERGE_REQUEST_DIFFS,
            "List the file diffs of a merge request",
            crate::schema_from_type!(MergeRequestDiffsInput),
        ),
        Tool::new(
            GET_MERGE_REQUEST_PIPELINES,
            "List the pipelines run for a merge request",
            crate::schema_from_type!(MergeRequestInput),
        ),
    ]
}

pub async fn create(
    client: &RestClient,
    input: CreateMergeRequestInput,
) -> Result<CallToolResult, McpError> {
    let path = format!("/projects/{}/merge_requests", input.project_id.encoded());
    let merge_request: Value = client.post(&path, Some(&input)).await?;
    json_result(&merge_request)
}

pub async fn get(client: &RestClient, input: MergeRequestInput) -> Result<CallToolResult, McpError> {
    let merge_request: Value = client.get(&input.path(""), &Query::new()).await?;
    json_result(&merge_request)
}

pub async fn commits(
    client: &RestClient,
    input: MergeRequestInput,
) -> Result<CallToolResult, McpError> {
    let commits: Value = client.get(&input.path("/commits"), &Query::new()).await?;
    json_result(&commits)
}

pub async fn diffs(
    client: &RestClient,
    input: MergeRequestDiffsInput,
) -> Result<CallToolResult, McpError> {
    let query = Query::new().param("unidiff", input.unidiff);
    let diffs: Value = client
        .get(&input.merge_request.path("/diffs"), &query)
        .await?;
    json_result(&diffs)
}

pub async fn pipelines(
    client: &RestClient,
    input: MergeRequestInput,
) -> Result<CallToolResult, McpError> {
    let pipelines: Value = client.get(&input.path("/pipelines"), &Query::new()).await?;
    json_result(&pipelines)
}
