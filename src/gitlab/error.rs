//! Failure taxonomy shared by the REST and GraphQL clients.
//!
//! Anything that goes wrong while talking to GitLab is first captured as a
//! [`Failure`] and then collapsed by [`normalize`] into a [`GitLabError`],
//! which is the only error type the clients hand back to their callers.

use rmcp::ErrorData as McpError;
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Severity of a normalized failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Correctable by the caller: bad input, missing resource, auth failure.
    Client,
    /// GitLab-side or transport failure, or anything that could not be classified.
    Server,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Client => write!(f, "client-error"),
            ErrorKind::Server => write!(f, "server-error"),
        }
    }
}

/// A failure that went through [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GitLabError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
}

impl GitLabError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

/// Raw failure as observed by the clients, before classification.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQL(Vec<String>),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Normalized(#[from] GitLabError),
    #[error("{0}")]
    Unknown(String),
}

impl Failure {
    /// Wraps an opaque value that carries neither a status nor an error message.
    #[cfg(test)]
    pub fn unknown(value: impl fmt::Debug) -> Self {
        Failure::Unknown(format!("{value:?}"))
    }

    fn status(&self) -> Option<u16> {
        match self {
            Failure::Status { status, .. } => Some(*status),
            Failure::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Collapses a raw failure into one of the two severities.
///
/// Already-normalized errors come back untouched, so re-raising through this
/// function never nests messages.
pub fn normalize(failure: Failure) -> GitLabError {
    if let Failure::Normalized(error) = failure {
        return error;
    }
    if let Failure::Unknown(value) = &failure {
        return GitLabError {
            kind: ErrorKind::Server,
            message: format!("Unknown error: {value}"),
            status: None,
        };
    }

    let status = failure.status();
    match status {
        Some(status @ 400..500) => GitLabError {
            kind: ErrorKind::Client,
            message: format!("GitLab API client error ({status}): {failure}"),
            status: Some(status),
        },
        Some(status @ 500..) => GitLabError {
            kind: ErrorKind::Server,
            message: format!("GitLab API server error ({status}): {failure}"),
            status: Some(status),
        },
        _ => GitLabError {
            kind: ErrorKind::Server,
            message: format!("GitLab API error: {failure}"),
            status,
        },
    }
}

impl From<Failure> for GitLabError {
    fn from(failure: Failure) -> Self {
        normalize(failure)
    }
}

impl From<GitLabError> for McpError {
    fn from(error: GitLabError) -> Self {
        let data = Some(json!({
            "kind": error.kind().to_string(),
            "status": error.status(),
        }));
        match error.kind {
            ErrorKind::Client => McpError::invalid_params(error.message, data),
            ErrorKind::Server => McpError::internal_error(error.message, data),
        }
    }
}
