use super::json_result;
use crate::gitlab::{GraphQLClient, Query, ResourceId, RestClient};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SEARCH: &str = "search";
pub const SEARCH_LABELS: &str = "search_labels";
pub const SEMANTIC_CODE_SEARCH: &str = "semantic_code_search";

const SEMANTIC_CODE_SEARCH_QUERY: &str = r#"
query codeSnippetSearch(
  $projectPath: ID!
  $search: String!
  $after: String
  $first: Int
) {
  codeSnippetSearch(
    projectPath: $projectPath
    search: $search
    after: $after
    first: $first
  ) {
    nodes {
      filename
      projectPath
      ref
      startLine
      data
      blobPath
    }
    pageInfo { hasNextPage endCursor }
  }
}
"#;

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    Projects,
    Issues,
    MergeRequests,
    Milestones,
    SnippetTitles,
    WikiBlobs,
    Commits,
    Blobs,
    Notes,
    Users,
}

impl SearchScope {
    fn as_str(self) -> &'static str {
        match self {
            SearchScope::Projects => "projects",
            SearchScope::Issues => "issues",
            SearchScope::MergeRequests => "merge_requests",
            SearchScope::Milestones => "milestones",
            SearchScope::SnippetTitles => "snippet_titles",
            SearchScope::WikiBlobs => "wiki_blobs",
            SearchScope::Commits => "commits",
            SearchScope::Blobs => "blobs",
            SearchScope::Notes => "notes",
            SearchScope::Users => "users",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchInput {
    /// Kind of object to search for
    scope: SearchScope,
    /// Search terms
    search: String,
    /// Restrict the search to this project (takes precedence over `group_id`)
    project_id: Option<ResourceId>,
    /// Restrict the search to this group
    group_id: Option<ResourceId>,
    /// Page number
    page: Option<u32>,
    /// Page size, at most 100
    per_page: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchLabelsInput {
    /// Project ID or path, exclusive with `group_id`
    project_id: Option<ResourceId>,
    /// Group ID or path, exclusive with `project_id`
    group_id: Option<ResourceId>,
    /// Fuzzy match on the label name
    search: Option<String>,
    /// Page number
    page: Option<u32>,
    /// Page size
    per_page: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SemanticCodeSearchInput {
    /// Full project path, e.g. `my-group/my-project`
    project_path: String,
    /// Natural language or code query
    search: String,
    /// Pagination cursor
    after: Option<String>,
    /// Number of snippets to return
    first: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CodeSearchVariables<'a> {
    project_path: &'a str,
    search: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeSearchData {
    code_snippet_search: Option<Value>,
}

pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            SEARCH,
            "Search GitLab globally, within a group or within a project",
            crate::schema_from_type!(SearchInput),
        ),
        Tool::new(
            SEARCH_LABELS,
            "Search the labels of a project or group",
            crate::schema_from_type!(SearchLabelsInput),
        ),
        Tool::new(
            SEMANTIC_CODE_SEARCH,
            "Semantic code search within a project (requires GitLab Duo)",
            crate::schema_from_type!(SemanticCodeSearchInput),
        ),
    ]
}

/// Scopes `resource` to the project if given, otherwise to the group.
fn scoped_path(
    project_id: Option<&ResourceId>,
    group_id: Option<&ResourceId>,
    resource: &str,
) -> Option<String> {
    match (project_id, group_id) {
        (Some(project), _) => Some(format!("/projects/{}/{resource}", project.encoded())),
        (None, Some(group)) => Some(format!("/groups/{}/{resource}", group.encoded())),
        (None, None) => None,
    }
}

pub async fn search(client: &RestClient, input: SearchInput) -> Result<CallToolResult, McpError> {
    let path = scoped_path(input.project_id.as_ref(), input.group_id.as_ref(), "search")
        .unwrap_or_else(|| "/search".to_string());
    let query = Query::new()
        .param("scope", Some(input.scope.as_str()))
        .param("search", Some(&input.search))
        .param("page", input.page)
        .param("per_page", input.per_page);
    let results: Value = client.get(&path, &query).await?;
    json_result(&results)
}

pub async fn labels(
    client: &RestClient,
    input: SearchLabelsInput,
) -> Result<CallToolResult, McpError> {
    let path = scoped_path(input.project_id.as_ref(), input.group_id.as_ref(), "labels")
        .ok_or_else(|| McpError::invalid_params("Either project_id or group_id is required", None))?;
    let query = Query::new()
        .param("search", input.search)
        .param("page", input.page)
        .param("per_page", input.per_page);
    let labels: Value = client.get(&path, &query).await?;
    json_result(&labels)
}

pub async fn semantic_code(
    client: &GraphQLClient,
    input: SemanticCodeSearchInput,
) -> Result<CallToolResult, McpError> {
    let variables = CodeSearchVariables {
        project_path: &input.project_path,
        search: &input.search,
        after: input.after.as_deref(),
        first: input.first,
    };
    let data: CodeSearchData = client
        .query(SEMANTIC_CODE_SEARCH_QUERY, Some(&variables))
        .await?;
    json_result(&data.code_snippet_search)
}
