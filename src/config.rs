use crate::cli::Cli;
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::{fmt, path::Path};
use url::Url;

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

/// Connection settings shared by the REST and GraphQL clients.
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct GitLabConfig {
    base_url: String,
    token: String,
}

impl GitLabConfig {
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config_file {
            Some(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                parse_config::<ConfigFile>(&content, path)?
            }
            None => ConfigFile::default(),
        };
        Self::resolve(cli, file)
    }

    fn resolve(cli: &Cli, file: ConfigFile) -> Result<Self> {
        let base_url = cli
            .gitlab_url
            .clone()
            .or(file.gitlab_url.as_deref().map(check_env_reference))
            .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string());
        let token = cli
            .gitlab_token
            .clone()
            .or(file.gitlab_token.as_deref().map(check_env_reference))
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| anyhow!("GITLAB_TOKEN is not set"))?;

        let config = Self::new(&base_url, token);
        let parsed = Url::parse(config.base_url())
            .with_context(|| format!("Invalid GitLab URL: {}", config.base_url()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Unsupported GitLab URL scheme: {}", parsed.scheme());
        }
        Ok(config)
    }
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    gitlab_url: Option<String>,
    gitlab_token: Option<String>,
}

/// Replaces a `${NAME}` value with the content of environment variable `NAME`.
/// Anything else, or a reference to an unset variable, is returned unchanged.
fn check_env_reference(value: &str) -> String {
    if let Some(stripped) = value.strip_prefix("${").and_then(|s| s.strip_suffix("}")) {
        match std::env::var(stripped) {
            Ok(env_value) => {
                tracing::debug!("Resolved environment variable reference ${{{stripped}}}");
                env_value
            }
            Err(_) => {
                tracing::warn!("Environment variable {stripped} not found, keeping original value");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

pub(crate) fn parse_config<T: serde::de::DeserializeOwned>(
    content: &str,
    file_path: &Path,
) -> Result<T> {
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("json");

    match extension.to_lowercase().as_str() {
        "json" => serde_json::from_str(content).context("Failed to parse JSON config"),
        "yaml" | "yml" => serde_yaml::from_str(content).context("Failed to parse YAML config"),
        "toml" => toml::from_str(content).context("Failed to parse TOML config"),
        _ => Err(anyhow!("Unsupported config file format: {}", extension)),
    }
}
