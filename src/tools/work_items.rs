use super::json_result;
use crate::gitlab::{Failure, GraphQLClient, normalize};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CREATE_WORKITEM_NOTE: &str = "create_workitem_note";
pub const GET_WORKITEM_NOTES: &str = "get_workitem_notes";

const CREATE_NOTE_MUTATION: &str = r#"
mutation createNote($input: CreateNoteInput!) {
  createNote(input: $input) {
    note {
      id
      body
      createdAt
      updatedAt
      system
      author { id username name }
    }
    errors
  }
}
"#;

const GET_WORK_ITEM_NOTES_QUERY: &str = r#"
query getWorkItemNotes(
  $fullPath: ID!
  $iid: String!
  $after: String
  $before: String
  $first: Int
  $last: Int
) {
  workItem(fullPath: $fullPath, iid: $iid) {
    id
    iid
    title
    notes(after: $after, before: $before, first: $first, last: $last) {
      nodes {
        id
        body
        createdAt
        updatedAt
        system
        author { id username name }
      }
      pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
    }
  }
}
"#;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateNoteInput {
    /// Global ID of the work item, e.g. `gid://gitlab/WorkItem/123`
    noteable_id: String,
    /// Note body, Markdown supported
    body: String,
    /// Only visible to project members with at least Reporter access
    internal: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WorkItemNotesInput {
    /// Full path of the project or group owning the work item
    full_path: String,
    /// Work item IID within the project or group
    work_item_iid: String,
    /// Return notes after this cursor
    after: Option<String>,
    /// Return notes before this cursor
    before: Option<String>,
    /// Return the first N notes
    first: Option<u32>,
    /// Return the last N notes
    last: Option<u32>,
}

#[derive(Serialize)]
struct CreateNoteVariables<'a> {
    input: NoteMutationInput<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NoteMutationInput<'a> {
    noteable_id: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    internal: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotesVariables<'a> {
    full_path: &'a str,
    iid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateNoteData {
    create_note: CreateNotePayload,
}

#[derive(Deserialize)]
struct CreateNotePayload {
    note: Option<Value>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkItemData {
    work_item: Option<Value>,
}

pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            CREATE_WORKITEM_NOTE,
            "Add a note to a GitLab work item such as an issue or epic",
            crate::schema_from_type!(CreateNoteInput),
        ),
        Tool::new(
            GET_WORKITEM_NOTES,
            "List the notes of a GitLab work item with cursor pagination",
            crate::schema_from_type!(WorkItemNotesInput),
        ),
    ]
}

pub async fn create_note(
    client: &GraphQLClient,
    input: CreateNoteInput,
) -> Result<CallToolResult, McpError> {
    let variables = CreateNoteVariables {
        input: NoteMutationInput {
            noteable_id: &input.noteable_id,
            body: &input.body,
            internal: input.internal,
        },
    };
    let data: CreateNoteData = client
        .query(CREATE_NOTE_MUTATION, Some(&variables))
        .await?;

    let payload = data.create_note;
    if !payload.errors.is_empty() {
        let message = format!("Failed to create note: {}", payload.errors.join(", "));
        return Err(normalize(Failure::Message(message)).into());
    }
    json_result(&payload.note)
}

pub async fn notes(
    client: &GraphQLClient,
    input: WorkItemNotesInput,
) -> Result<CallToolResult, McpError> {
    let variables = NotesVariables {
        full_path: &input.full_path,
        iid: &input.work_item_iid,
        after: input.after.as_deref(),
        before: input.before.as_deref(),
        first: input.first,
        last: input.last,
    };
    let data: WorkItemData = client
        .query(GET_WORK_ITEM_NOTES_QUERY, Some(&variables))
        .await?;
    json_result(&data.work_item)
}
