use super::json_result;
use crate::gitlab::{Query, ResourceId, RestClient};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

pub const GET_PIPELINE_JOBS: &str = "get_pipeline_jobs";
pub const MANAGE_PIPELINE: &str = "manage_pipeline";

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobScope {
    Created,
    Pending,
    Running,
    Failed,
    Success,
    Canceled,
    Skipped,
    WaitingForResource,
    Manual,
}

impl JobScope {
    fn as_str(self) -> &'static str {
        match self {
            JobScope::Created => "created",
            JobScope::Pending => "pending",
            JobScope::Running => "running",
            JobScope::Failed => "failed",
            JobScope::Success => "success",
            JobScope::Canceled => "canceled",
            JobScope::Skipped => "skipped",
            JobScope::WaitingForResource => "waiting_for_resource",
            JobScope::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Running,
    Pending,
    Finished,
    Branches,
    Tags,
}

impl PipelineStatus {
    fn as_str(self) -> &'static str {
        match self {
            PipelineStatus::Running => "running",
            PipelineStatus::Pending => "pending",
            PipelineStatus::Finished => "finished",
            PipelineStatus::Branches => "branches",
            PipelineStatus::Tags => "tags",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PipelineJobsInput {
    /// Project ID or URL-encodable `namespace/project` path
    project_id: ResourceId,
    /// Pipeline ID
    pipeline_id: u64,
    /// Only return jobs in this state
    scope: Option<JobScope>,
}

/// Input for `manage_pipeline`. The first matching action wins:
/// `list`, then `ref` without `pipeline_id` (create), then `retry`,
/// `cancel`, `name` (rename) and finally delete.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ManagePipelineInput {
    /// Project ID or URL-encodable `namespace/project` path
    project_id: ResourceId,
    /// Pipeline ID, required for every action on an existing pipeline
    pipeline_id: Option<u64>,
    /// List the project's pipelines
    #[serde(default)]
    list: bool,
    /// Branch or tag to run a new pipeline for
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    /// Retry the failed jobs of the pipeline
    #[serde(default)]
    retry: bool,
    /// Cancel the pipeline's running jobs
    #[serde(default)]
    cancel: bool,
    /// New pipeline name
    name: Option<String>,
    /// Filter listed pipelines by status
    status: Option<PipelineStatus>,
    /// Page number when listing
    page: Option<u32>,
    /// Page size when listing, at most 100
    per_page: Option<u32>,
}

pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            GET_PIPELINE_JOBS,
            "List the jobs of a pipeline",
            crate::schema_from_type!(PipelineJobsInput),
        ),
        Tool::new(
            MANAGE_PIPELINE,
            "Manage pipelines: list them (list=true), run one for a ref (ref without \
             pipeline_id), retry (retry=true), cancel (cancel=true), rename (name) or \
             delete (only pipeline_id)",
            crate::schema_from_type!(ManagePipelineInput),
        ),
    ]
}

pub async fn jobs(client: &RestClient, input: PipelineJobsInput) -> Result<CallToolResult, McpError> {
    let path = format!(
        "/projects/{}/pipelines/{}/jobs",
        input.project_id.encoded(),
        input.pipeline_id
    );
    let query = Query::new().param("scope", input.scope.map(JobScope::as_str));
    let jobs: Value = client.get(&path, &query).await?;
    json_result(&jobs)
}

pub async fn manage(
    client: &RestClient,
    input: ManagePipelineInput,
) -> Result<CallToolResult, McpError> {
    let project = input.project_id.encoded();

    if input.list {
        let query = Query::new()
            .param("status", input.status.map(PipelineStatus::as_str))
            .param("page", input.page)
            .param("per_page", input.per_page);
        let pipelines: Value = client
            .get(&format!("/projects/{project}/pipelines"), &query)
            .await?;
        return json_result(&pipelines);
    }

    let git_ref = input.git_ref.filter(|git_ref| !git_ref.is_empty());
    let pipeline_id = match (input.pipeline_id, git_ref) {
        (None, Some(git_ref)) => {
            debug!("Creating pipeline for {git_ref} in project {}", input.project_id);
            let pipeline: Value = client
                .post(
                    &format!("/projects/{project}/pipeline"),
                    Some(&json!({ "ref": git_ref })),
                )
                .await?;
            return json_result(&pipeline);
        }
        (None, None) => {
            return Err(McpError::invalid_params(
                "pipeline_id is required unless list=true or a ref is given to create a pipeline",
                None,
            ));
        }
        (Some(id), _) => id,
    };
    let path = format!("/projects/{project}/pipelines/{pipeline_id}");

    if input.retry {
        let pipeline: Value = client.post(&format!("{path}/retry"), None::<&()>).await?;
        return json_result(&pipeline);
    }
    if input.cancel {
        let pipeline: Value = client.post(&format!("{path}/cancel"), None::<&()>).await?;
        return json_result(&pipeline);
    }
    if let Some(name) = input.name {
        let pipeline: Value = client
            .put(&format!("{path}/metadata"), Some(&json!({ "name": name })))
            .await?;
        return json_result(&pipeline);
    }

    client.delete::<Option<Value>>(&path).await?;
    json_result(&json!({
        "success": true,
        "message": format!("Pipeline {pipeline_id} deleted"),
    }))
}
