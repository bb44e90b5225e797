//! Request utilities for HTTP endpoints.

use http_body_util::BodyExt;
use hyper::{body::Bytes, Request, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time;

use crate::router::RouterError;
use cascade_view_core::error::MetaError;

/// Helper function to read request body with timeout
pub async fn read_request_body_with_timeout(
    req: Request<hyper::body::Incoming>,
    timeout_ms: u64,
) -> Result<Request<Bytes>, RouterError> {
    let (parts, body) = req.into_parts();
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let body = time::timeout(timeout_duration, body.collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Failed to read request body: {}", e)))?;
    Ok(Request::from_parts(parts, body.to_bytes()))
}

/// Parses a JSON request body.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, RouterError> {
    serde_json::from_slice(body)
        .map_err(|e| RouterError::BadRequest(format!("Failed to parse request: {}", e)))
}

/// Map MetaError to appropriate RouterError
pub fn map_meta_error_to_router_error(e: MetaError) -> RouterError {
    match e {
        MetaError::RepoNotFound { .. }
        | MetaError::LineNotFound { .. }
        | MetaError::ItemNotFound { .. }
        | MetaError::EmptyMeta { .. } => RouterError::NotFound(e.to_string()),
        MetaError::InvalidRequest(_) | MetaError::LineTypeMismatch { .. } => {
            RouterError::BadRequest(e.to_string())
        }
        _ => RouterError::InternalError(format!("Store error: {}", e)),
    }
}

/// Path of a repo.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepoPathSpec {
    pub repo: String,
}

/// Path of a line.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinePathSpec {
    pub repo: String,
    pub line: String,
}

/// Path of a model, by index in its line.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelPathSpec {
    pub repo: String,
    pub line: String,
    pub num: usize,
}

/// Path of a dataset version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetPathSpec {
    pub repo: String,
    pub line: String,
    pub ver: String,
}

/// Request for a line table.
#[derive(Debug, Deserialize)]
pub struct LineItemTableRequest {
    pub line_path: LinePathSpec,
    /// Requested columns, in display order
    pub item_fields: Vec<String>,
}

/// Request to add a comment.
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub comment: String,
    /// Names from the workspace down: [], [repo], [repo, line] or
    /// [repo, line, item]
    #[serde(default)]
    pub path_parts: Vec<String>,
}

/// Request for item search suggestions.
#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    pub line_path: LinePathSpec,
    #[serde(default)]
    pub query: String,
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(status: u16, json: Vec<u8>) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Serializes `data` and wraps it in a 200 response.
pub fn json_response<T: Serialize>(data: &T) -> Result<Response<Bytes>, RouterError> {
    let json = serde_json::to_vec(data)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;
    build_response(200, json)
}

/// Helper to build a response with an arbitrary content type
pub fn build_file_response(
    content_type: &str,
    contents: Vec<u8>,
) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .body(Bytes::from(contents))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Helper to build empty HTTP response (for 204 No Content)
pub fn build_empty_response(status: u16) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .body(Bytes::new())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}
