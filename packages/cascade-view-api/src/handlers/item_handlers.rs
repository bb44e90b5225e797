//! Model and dataset views, run logs and run configs.

use hyper::{body::Bytes, Response};
use serde_json::Value;

use crate::router::{AppState, RouterError};
use cascade_view_core::meta::MetadataRecord;
use cascade_view_core::store::{ItemSource, Line, LineKind};

use super::request_utils::{
    json_response, map_meta_error_to_router_error, parse_json_body, DatasetPathSpec,
    ModelPathSpec,
};
use super::response::{ConfigResponse, DatasetResponse, LogResponse, ModelResponse};

fn open_model_line(spec: &ModelPathSpec, state: &AppState) -> Result<Line, RouterError> {
    let line = state
        .open_workspace()?
        .line(&spec.repo, &spec.line)
        .map_err(map_meta_error_to_router_error)?;
    line.expect_kind(LineKind::Model)
        .map_err(map_meta_error_to_router_error)?;
    Ok(line)
}

fn owned_str(meta: &MetadataRecord, key: &str) -> Option<String> {
    meta.get_str(key).map(str::to_string)
}

fn string_list(meta: &MetadataRecord, key: &str) -> Option<Vec<String>> {
    match meta.get(key) {
        Some(Value::Array(values)) => Some(
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

/// Full view of one model.
///
/// # Endpoint
/// `POST /v1/model`
///
/// # Request Body
/// ```json
/// {"repo": "repo_1", "line": "00000", "num": 0}
/// ```
///
/// # Notes
/// - Optional metadata keys that are absent come back as null
/// - `files` and `artifacts` list the item's stored files with sizes
///
/// # Errors
/// - **400 Bad Request**: The line is a data line
/// - **404 Not Found**: Repo, line or model does not exist, or the model
///   has no metadata
pub fn model(body: &[u8], state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let spec: ModelPathSpec = parse_json_body(body)?;
    let line = open_model_line(&spec, state)?;
    let meta = line
        .load_item_meta(spec.num)
        .map_err(map_meta_error_to_router_error)?;
    let path = line
        .item_dir(spec.num)
        .map_err(map_meta_error_to_router_error)?;
    let files = line
        .item_files(spec.num)
        .map_err(map_meta_error_to_router_error)?;
    let artifacts = line
        .item_artifacts(spec.num)
        .map_err(map_meta_error_to_router_error)?;

    let params = match meta.get("params") {
        Some(Value::Object(params)) => params.clone(),
        _ => serde_json::Map::new(),
    };

    json_response(&ModelResponse {
        slug: owned_str(&meta, "slug"),
        path: path.display().to_string(),
        created_at: owned_str(&meta, "created_at"),
        saved_at: owned_str(&meta, "saved_at"),
        user: owned_str(&meta, "user"),
        host: owned_str(&meta, "host"),
        cwd: owned_str(&meta, "cwd"),
        python_version: owned_str(&meta, "python_version"),
        description: owned_str(&meta, "description"),
        tags: meta.tags(),
        comments: meta.comments(),
        params,
        metrics: meta.metrics(),
        artifacts: artifacts.into_iter().map(Into::into).collect(),
        files: files.into_iter().map(Into::into).collect(),
        git_commit: owned_str(&meta, "git_commit"),
        git_uncommitted_changes: string_list(&meta, "git_uncommitted_changes"),
    })
}

/// Full view of one dataset version.
///
/// # Endpoint
/// `POST /v1/dataset`
///
/// # Request Body
/// ```json
/// {"repo": "data", "line": "images", "ver": "0.1"}
/// ```
///
/// # Errors
/// - **400 Bad Request**: The line is a model line
/// - **404 Not Found**: Repo, line or version does not exist
pub fn dataset(body: &[u8], state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let spec: DatasetPathSpec = parse_json_body(body)?;
    let line = state
        .open_workspace()?
        .line(&spec.repo, &spec.line)
        .map_err(map_meta_error_to_router_error)?;
    line.expect_kind(LineKind::Data)
        .map_err(map_meta_error_to_router_error)?;

    let index = line
        .find_item(&spec.ver)
        .map_err(map_meta_error_to_router_error)?;
    let meta = line
        .load_item_meta(index)
        .map_err(map_meta_error_to_router_error)?;
    let path = line.item_dir(index).map_err(map_meta_error_to_router_error)?;

    json_response(&DatasetResponse {
        name: owned_str(&meta, "name").unwrap_or_else(|| spec.ver.clone()),
        path: path.display().to_string(),
        saved_at: owned_str(&meta, "saved_at"),
        user: owned_str(&meta, "user"),
        host: owned_str(&meta, "host"),
        cwd: owned_str(&meta, "cwd"),
        python_version: owned_str(&meta, "python_version"),
        description: owned_str(&meta, "description"),
        tags: meta.tags(),
        comments: meta.comments(),
        git_commit: owned_str(&meta, "git_commit"),
        git_uncommitted_changes: string_list(&meta, "git_uncommitted_changes"),
    })
}

/// Log text of a model's run.
///
/// # Endpoint
/// `POST /v1/run_log`
///
/// # Response
/// - **200 OK**: `{"log_text": "..."}`, null when no log was recorded
pub fn run_log(body: &[u8], state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let spec: ModelPathSpec = parse_json_body(body)?;
    let line = open_model_line(&spec, state)?;
    let log_text = line
        .run_log(spec.num)
        .map_err(map_meta_error_to_router_error)?;
    json_response(&LogResponse { log_text })
}

/// Configuration and overrides of a model's run.
///
/// # Endpoint
/// `POST /v1/run_config`
///
/// # Response
/// - **200 OK**: `{"config": {...}, "overrides": {...}}`, each null when absent
pub fn run_config(body: &[u8], state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let spec: ModelPathSpec = parse_json_body(body)?;
    let line = open_model_line(&spec, state)?;
    let (config, overrides) = line
        .run_config(spec.num)
        .map_err(map_meta_error_to_router_error)?;
    json_response(&ConfigResponse { config, overrides })
}
