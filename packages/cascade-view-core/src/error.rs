//! Metadata store error types.

use thiserror::Error;

/// Errors raised while reading or shaping workspace metadata.
#[derive(Error, Debug, Clone)]
pub enum MetaError {
    /// Workspace root is missing or is not a workspace
    #[error("Invalid workspace at '{path}': {reason}")]
    InvalidWorkspace { path: String, reason: String },

    /// Repository not found in workspace
    #[error("Repo '{repo}' not found")]
    RepoNotFound { repo: String },

    /// Line not found in repository
    #[error("Line '{line}' not found in repo '{repo}'")]
    LineNotFound { repo: String, line: String },

    /// Item not found in line
    #[error("Item '{item}' not found in line '{line}'")]
    ItemNotFound { line: String, item: String },

    /// Item exists but has no readable metadata
    #[error("No metadata in '{path}'")]
    EmptyMeta { path: String },

    /// Line is of the wrong kind for the request
    #[error("Line '{line}' is a {actual}, expected a {expected}")]
    LineTypeMismatch {
        line: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Caller supplied an unusable request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Metadata file could not be parsed
    #[error("Parse error in '{path}': {message}")]
    Parse { path: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Permission denied while touching the workspace
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl MetaError {
    /// True for the condition that makes table builders skip an item.
    pub fn is_empty_meta(&self) -> bool {
        matches!(self, MetaError::EmptyMeta { .. })
    }
}
