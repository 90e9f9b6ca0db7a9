use super::{error::GitLabError, transport::Transport};
use crate::config::GitLabConfig;
use reqwest::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;

const API_PREFIX: &str = "/api/v4";

/// A project or group reference: numeric ID or `namespace/project` path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ResourceId {
    Numeric(u64),
    Path(String),
}

impl ResourceId {
    /// Path-segment-safe form, `group/project` becomes `group%2Fproject`.
    pub fn encoded(&self) -> String {
        encode_id(self)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Numeric(id) => write!(f, "{id}"),
            ResourceId::Path(path) => write!(f, "{path}"),
        }
    }
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        ResourceId::Numeric(id)
    }
}

impl From<&str> for ResourceId {
    fn from(path: &str) -> Self {
        ResourceId::Path(path.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(path: String) -> Self {
        ResourceId::Path(path)
    }
}

/// Encodes an identifier for use as one path segment.
pub fn encode_id(id: impl fmt::Display) -> String {
    urlencoding::encode(&id.to_string()).into_owned()
}

/// Query parameters for a REST call. Absent values are never serialized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.0.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Client for `{base_url}/api/v4`.
#[derive(Clone, Debug)]
pub struct RestClient {
    transport: Transport,
}

impl RestClient {
    pub fn new(config: GitLabConfig) -> Self {
        Self {
            transport: Transport::new(config),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T, GitLabError> {
        self.request::<(), T>(Method::GET, path, query, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T, GitLabError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, &Query::new(), body).await
    }

    pub async fn put<B, T>(&self, path: &str, body: Option<&B>) -> Result<T, GitLabError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::PUT, path, &Query::new(), body).await
    }

    /// Deletes a resource. GitLab answers most deletes with 204, so `T` is
    /// usually `()` or `Option<_>`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitLabError> {
        self.request::<(), T>(Method::DELETE, path, &Query::new(), None)
            .await
    }

    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&B>,
    ) -> Result<T, GitLabError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut url = self.transport.url(&format!("{API_PREFIX}{path}"))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query.0);
        }
        self.transport.send(method, url, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::error::ErrorKind;
    use mockito::Matcher;
    use serde_json::{Value, json};

    fn client(server: &mockito::Server) -> RestClient {
        RestClient::new(GitLabConfig::new(&server.url(), "test-token"))
    }

    #[test]
    fn test_encode_id() {
        assert_eq!(encode_id("my-group/my-project"), "my-group%2Fmy-project");
        assert_eq!(
            encode_id("group/subgroup/project"),
            "group%2Fsubgroup%2Fproject"
        );
        assert_eq!(encode_id(123u64), "123");
        assert_eq!(encode_id("123"), "123");
        assert_eq!(encode_id("my_group/my.project-1"), "my_group%2Fmy.project-1");
    }

    #[test]
    fn test_resource_id_deserializes_number_or_path() {
        let id: ResourceId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(id, ResourceId::Numeric(42));
        let id: ResourceId = serde_json::from_value(json!("a/b")).unwrap();
        assert_eq!(id, ResourceId::Path("a/b".to_string()));
        assert_eq!(id.to_string(), "a/b");
    }

    #[test]
    fn test_query_skips_absent_values() {
        let query = Query::new()
            .param("page", Some(1))
            .param("search", None::<String>)
            .param("state", Some("opened"));
        assert_eq!(
            query.0,
            vec![
                ("page".to_string(), "1".to_string()),
                ("state".to_string(), "opened".to_string())
            ]
        );
        assert!(Query::new().param("unidiff", None::<bool>).is_empty());
    }

    #[tokio::test]
    async fn test_get_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/1")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 1, "name": "test"}"#)
            .expect(1)
            .create_async()
            .await;

        let result: Value = client(&server)
            .get("/projects/1", &Query::new())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({"id": 1, "name": "test"}));
    }

    #[tokio::test]
    async fn test_get_with_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("per_page".into(), "20".into()),
                Matcher::UrlEncoded("state".into(), "opened".into()),
            ]))
            .with_body("[]")
            .create_async()
            .await;

        let query = Query::new()
            .param("page", Some(1))
            .param("per_page", Some(20))
            .param("state", Some("opened"))
            .param("search", None::<&str>);
        let result: Value = client(&server).get("/projects", &query).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!([]));
    }

    #[tokio::test]
    async fn test_get_encoded_project_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/my-group%2Fmy-project")
            .with_body(r#"{"id": 7}"#)
            .create_async()
            .await;

        let path = format!("/projects/{}", encode_id("my-group/my-project"));
        let result: Value = client(&server).get(&path, &Query::new()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result["id"], 7);
    }

    #[tokio::test]
    async fn test_get_404_is_client_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/projects/999")
            .with_status(404)
            .with_body(r#"{"message": "404 Project Not Found"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .get::<Value>("/projects/999", &Query::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Client);
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.message(),
            "GitLab API client error (404): 404 Project Not Found"
        );
    }

    #[tokio::test]
    async fn test_error_field_and_status_phrase_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/user")
            .with_status(401)
            .with_body(r#"{"error": "invalid_token"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/v4/projects/1/jobs")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let client = client(&server);
        let err = client.get::<Value>("/user", &Query::new()).await.unwrap_err();
        assert_eq!(err.message(), "GitLab API client error (401): invalid_token");

        let err = client
            .get::<Value>("/projects/1/jobs", &Query::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.message(), "GitLab API server error (502): Bad Gateway");
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v4/projects/1/issues")
            .match_header("authorization", "Bearer test-token")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"title": "test"})))
            .with_status(201)
            .with_body(r#"{"id": 1, "iid": 3}"#)
            .create_async()
            .await;

        let result: Value = client(&server)
            .post("/projects/1/issues", Some(&json!({"title": "test"})))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, json!({"id": 1, "iid": 3}));
    }

    #[tokio::test]
    async fn test_post_without_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v4/projects/1/pipelines/5/retry")
            .match_header("content-type", Matcher::Missing)
            .match_body("")
            .with_status(201)
            .with_body(r#"{"id": 5, "status": "pending"}"#)
            .create_async()
            .await;

        let result: Value = client(&server)
            .post::<Value, _>("/projects/1/pipelines/5/retry", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result["status"], "pending");
    }

    #[tokio::test]
    async fn test_put_sends_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/api/v4/projects/1/pipelines/5/metadata")
            .match_body(Matcher::Json(json!({"name": "nightly"})))
            .with_body(r#"{"id": 5, "name": "nightly"}"#)
            .create_async()
            .await;

        let result: Value = client(&server)
            .put("/projects/1/pipelines/5/metadata", Some(&json!({"name": "nightly"})))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result["name"], "nightly");
    }

    #[tokio::test]
    async fn test_delete_204_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/v4/projects/1/pipelines/100")
            .with_status(204)
            .expect(2)
            .create_async()
            .await;

        let client = client(&server);
        client
            .delete::<()>("/projects/1/pipelines/100")
            .await
            .unwrap();
        let result: Option<Value> = client.delete("/projects/1/pipelines/100").await.unwrap();

        mock.assert_async().await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_invalid_success_body_is_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v4/version")
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server)
            .get::<Value>("/version", &Query::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status(), None);
        assert!(err.message().starts_with("GitLab API error: Invalid response body"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_server_error() {
        let client = RestClient::new(GitLabConfig::new("http://127.0.0.1:1", "t"));
        let err = client
            .get::<Value>("/projects/1", &Query::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(err.status().is_none());
        assert!(err.message().starts_with("GitLab API error: "));
    }
}
