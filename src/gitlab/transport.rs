use super::error::{Failure, GitLabError};
use crate::config::GitLabConfig;
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .user_agent(concat!("gitlab-mcp/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
});

/// Request/response plumbing shared by the REST and GraphQL clients.
#[derive(Clone, Debug)]
pub(crate) struct Transport {
    http: Client,
    config: GitLabConfig,
}

impl Transport {
    pub fn new(config: GitLabConfig) -> Self {
        Self {
            http: HTTP_CLIENT.clone(),
            config,
        }
    }

    /// Joins `path` onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Failure> {
        let raw = format!("{}{}", self.config.base_url(), path);
        Url::parse(&raw).map_err(|e| Failure::Message(format!("Invalid URL {raw}: {e}")))
    }

    /// Sends one authenticated request and decodes the JSON answer.
    ///
    /// Every failure is normalized before it leaves this function.
    pub async fn send<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, GitLabError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        Ok(self.execute(method, url, body).await?)
    }

    async fn execute<B, T>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, Failure>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("{method} {}", url.path());
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(self.config.token());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        read_json(response).await.inspect_err(|e| {
            tracing::warn!("{method} {} failed: {e}", url.path());
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, Failure> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_failure(status, response).await);
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Builds the failure for a non-success answer, preferring the `message` or
/// `error` field of a JSON body over the status phrase.
async fn status_failure(status: StatusCode, response: Response) -> Failure {
    let fallback = status.canonical_reason().unwrap_or("Unknown Status").to_string();
    let message = match response.bytes().await {
        Ok(bytes) => error_message(&bytes).unwrap_or(fallback),
        Err(_) => fallback,
    };
    Failure::Status {
        status: status.as_u16(),
        message,
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(key))
        .find_map(|field| match field {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message() {
        assert_eq!(
            error_message(br#"{"message": "404 Project Not Found", "error": "x"}"#).as_deref(),
            Some("404 Project Not Found")
        );
        assert_eq!(
            error_message(br#"{"error": "invalid_token"}"#).as_deref(),
            Some("invalid_token")
        );
        assert_eq!(
            error_message(br#"{"message": null, "error": "insufficient_scope"}"#).as_deref(),
            Some("insufficient_scope")
        );
    }

    #[test]
    fn test_error_message_structured() {
        assert_eq!(
            error_message(br#"{"message": {"title": ["can't be blank"]}}"#).as_deref(),
            Some(r#"{"title":["can't be blank"]}"#)
        );
    }

    #[test]
    fn test_error_message_unparseable() {
        assert_eq!(error_message(b""), None);
        assert_eq!(error_message(b"<html>Bad Gateway</html>"), None);
        assert_eq!(error_message(br#"{"status": 500}"#), None);
        assert_eq!(error_message(b"[1, 2]"), None);
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let transport = Transport::new(GitLabConfig::new("https://gitlab.example.com/", "t"));
        assert_eq!(
            transport.url("/api/v4/projects/1").unwrap().as_str(),
            "https://gitlab.example.com/api/v4/projects/1"
        );
        assert_eq!(
            transport.url("/api/v4/projects/a%2Fb").unwrap().as_str(),
            "https://gitlab.example.com/api/v4/projects/a%2Fb"
        );
    }
}
