use super::{
    error::{Failure, GitLabError, normalize},
    transport::Transport,
};
use crate::config::GitLabConfig;
use reqwest::Method;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

const GRAPHQL_PATH: &str = "/api/graphql";

#[derive(Serialize)]
struct Request<'a, V: Serialize + ?Sized> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a V>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<ErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    message: Option<String>,
}

const UNDESCRIBED_ERROR: &str = "GraphQL error without a message";

/// Client for the `{base_url}/api/graphql` endpoint.
#[derive(Clone, Debug)]
pub struct GraphQLClient {
    transport: Transport,
}

impl GraphQLClient {
    pub fn new(config: GitLabConfig) -> Self {
        Self {
            transport: Transport::new(config),
        }
    }

    /// Runs one query or mutation and returns its `data` member.
    ///
    /// A non-empty `errors` array fails the call even when `data` is present.
    /// A missing `data` member decodes as `null`.
    pub async fn query<V, T>(&self, document: &str, variables: Option<&V>) -> Result<T, GitLabError>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.transport.url(GRAPHQL_PATH)?;
        let request = Request {
            query: document,
            variables,
        };
        let envelope: Envelope = self.transport.send(Method::POST, url, Some(&request)).await?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            let mut messages = errors
                .into_iter()
                .filter_map(|e| e.message)
                .collect::<Vec<_>>();
            if messages.is_empty() {
                messages.push(UNDESCRIBED_ERROR.to_string());
            }
            tracing::warn!("GraphQL request returned {} error(s)", messages.len());
            return Err(normalize(Failure::GraphQL(messages)));
        }

        let data = envelope.data.unwrap_or(Value::Null);
        Ok(serde_json::from_value(data).map_err(Failure::from)?)
    }
}
