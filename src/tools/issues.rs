use super::json_result;
use crate::gitlab::{Query, ResourceId, RestClient};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CREATE_ISSUE: &str = "create_issue";
pub const GET_ISSUE: &str = "get_issue";

/// Input for `create_issue`. Everything but `project_id` is sent as the body.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct CreateIssueInput {
    /// Project ID or URL-encodable `namespace/project` path
    #[serde(skip_serializing)]
    project_id: ResourceId,
    /// Issue title
    title: String,
    /// Issue description, Markdown supported
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Comma-separated label names
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<String>,
    /// IDs of the users to assign
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee_ids: Option<Vec<u64>>,
    /// Milestone ID
    #[serde(skip_serializing_if = "Option::is_none")]
    milestone_id: Option<u64>,
    /// Due date, formatted `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetIssueInput {
    /// Project ID or URL-encodable `namespace/project` path
    project_id: ResourceId,
    /// Project-scoped issue IID (not the global ID)
    issue_iid: u64,
}

pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            CREATE_ISSUE,
            "Create a new issue in a GitLab project",
            crate::schema_from_type!(CreateIssueInput),
        ),
        Tool::new(
            GET_ISSUE,
            "Get the details of a single issue in a GitLab project",
            crate::schema_from_type!(GetIssueInput),
        ),
    ]
}

pub async fn create_issue(
    client: &RestClient,
    input: CreateIssueInput,
) -> Result<CallToolResult, McpError> {
    let path = format!("/projects/{}/issues", input.project_id.encoded());
    let issue: Value = client.post(&path, Some(&input)).await?;
    json_result(&issue)
}

pub async fn get_issue(client: &RestClient, input: GetIssueInput) -> Result<CallToolResult, McpError> {
    let path = format!(
        "/projects/{}/issues/{}",
        input.project_id.encoded(),
        input.issue_iid
    );
    let issue: Value = client.get(&path, &Query::new()).await?;
    json_result(&issue)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_issue_omits_absent_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v4/projects/my-group%2Fmy-project/issues")
            .match_body(Matcher::Json(json!({
                "title": "Broken build",
                "labels": "bug,ci",
                "assignee_ids": [3, 4]
            })))
            .with_status(201)
            .with_body(r#"{"id": 10, "iid": 2, "title": "Broken build"}"#)
            .create_async()
            .await;

        let result = tool_set(&server)
            .call(
                "create_issue",
                args(json!({
                    "project_id": "my-group/my-project",
                    "title": "Broken build",
                    "labels": "bug,ci",
                    "assignee_ids": [3, 4]
                })),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            result_json(&result),
            json!({"id": 10, "iid": 2, "title": "Broken build"})
        );
    }

    #[tokio::test]
    async fn test_get_issue() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/42/issues/7")
            .match_header("authorization", "Bearer test-token")
            .with_body(r#"{"id": 100, "iid": 7, "state": "opened"}"#)
            .create_async()
            .await;

        let result = tool_set(&server)
            .call("get_issue", args(json!({"project_id": "42", "issue_iid": 7})))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result_json(&result)["state"], "opened");
    }
}
