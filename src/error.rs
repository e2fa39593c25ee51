//! Error types for dynload.

use thiserror::Error;

/// Result type for dynload operations.
pub type Result<T> = std::result::Result<T, DynloadError>;

/// Main error type for dynload.
#[derive(Error, Debug)]
pub enum DynloadError {
    /// Every candidate URL probed unsuccessfully
    #[error("Unable to resolve URL for module {name} (tried: {urls})", urls = .tried.join(", "))]
    ResolutionFailed { name: String, tried: Vec<String> },

    /// A descriptor produced zero candidate URLs
    #[error("No candidate URLs for module {0}")]
    NoCandidates(String),

    /// No dynamic rule prefix matched the requested name
    #[error("No dynamic rule for module: {0}")]
    NoRule(String),

    /// Script loaded but the configured global was not found
    #[error("Global for module {name} not found: {pattern}")]
    GlobalNotFound { name: String, pattern: String },

    /// The injected script element failed to load
    #[error("Failed to load script {url}: {reason}")]
    ScriptLoad { url: String, reason: String },

    /// Dynamic import of an ES module failed
    #[error("Failed to import module {url}: {reason}")]
    ImportFailed { url: String, reason: String },

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General error with message
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for DynloadError {
    fn from(err: anyhow::Error) -> Self {
        DynloadError::Other(err.to_string())
    }
}

impl From<&str> for DynloadError {
    fn from(s: &str) -> Self {
        DynloadError::Other(s.to_string())
    }
}

impl From<String> for DynloadError {
    fn from(s: String) -> Self {
        DynloadError::Other(s)
    }
}
