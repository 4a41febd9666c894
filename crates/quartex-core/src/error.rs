//! Error types for quartex-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using quartex-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Quartex
#[derive(Error, Debug)]
pub enum Error {
    /// Generic extension operation failure, with an optional remediation hint
    #[error("{message}{}", suggestion.as_ref().map(|s| format!("\nSuggestion: {s}")).unwrap_or_default())]
    Extension {
        message: String,
        suggestion: Option<String>,
    },

    /// GitHub authentication required or failed
    #[error("GitHub authentication failed: {message}")]
    Authentication { message: String },

    /// Repository could not be found
    #[error("Repository not found: {repo}")]
    RepositoryNotFound { repo: String },

    /// Network failure, optionally carrying the HTTP status code
    #[error("Network error: {message}{}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Network {
        message: String,
        status: Option<u16>,
    },

    /// Path traversal or other filesystem escape detected
    #[error("Security violation: {message}")]
    Security { message: String },

    /// Manifest could not be read or parsed
    #[error("Invalid extension manifest at {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Schema file could not be read or parsed
    #[error("Invalid schema file at {path}: {message}")]
    Schema { path: PathBuf, message: String },

    /// Snippet file could not be read or parsed
    #[error("Invalid snippet file at {path}: {message}")]
    Snippet { path: PathBuf, message: String },

    /// Version string could not be resolved
    #[error("Invalid version: {message}")]
    Version { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a generic extension error
    pub fn extension(message: impl Into<String>) -> Self {
        Self::Extension {
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create an extension error with a remediation suggestion
    pub fn extension_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Extension {
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a repository-not-found error
    pub fn repository_not_found(repo: impl Into<String>) -> Self {
        Self::RepositoryNotFound { repo: repo.into() }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status: None,
        }
    }

    /// Create a network error carrying an HTTP status code
    pub fn network_with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Network {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a security violation error
    pub fn security(message: impl Into<String>) -> Self {
        Self::Security {
            message: message.into(),
        }
    }

    /// Create a manifest error
    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a snippet error
    pub fn snippet(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Snippet {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a version error
    pub fn version(message: impl Into<String>) -> Self {
        Self::Version {
            message: message.into(),
        }
    }
}
