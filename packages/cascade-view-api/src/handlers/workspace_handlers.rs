//! Workspace and repo listings, comments and version info.

use hyper::{body::Bytes, Response};

use crate::router::{AppState, RouterError};
use cascade_view_core::error::MetaError;
use cascade_view_core::store::{ItemSource, Workspace};

use super::request_utils::{
    json_response, map_meta_error_to_router_error, parse_json_body, AddCommentRequest,
    RepoPathSpec,
};
use super::response::{LineRow, RepoCard, RepoResponse, VersionResponse, WorkspaceResponse};

/// Describes the workspace and its repos.
///
/// # Endpoint
/// `POST /v1/workspace`
///
/// # Response
/// - **200 OK**
/// ```json
/// {
///   "name": "ws",
///   "len": 1,
///   "tags": [],
///   "comments": [],
///   "repos": [{"name": "repo_1", "len": 5, "tags": []}]
/// }
/// ```
///
/// # Errors
/// - **500 Internal Server Error**: Workspace missing or unreadable
pub fn workspace(state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let ws = state.open_workspace()?;
    let repos = repo_cards(&ws).map_err(map_meta_error_to_router_error)?;

    json_response(&WorkspaceResponse {
        name: ws.name(),
        len: repos.len(),
        tags: ws.meta().tags(),
        comments: ws.meta().comments(),
        repos,
    })
}

fn repo_cards(ws: &Workspace) -> Result<Vec<RepoCard>, MetaError> {
    ws.repo_names()?
        .into_iter()
        .map(|name| -> Result<RepoCard, MetaError> {
            let repo = ws.repo(&name)?;
            Ok(RepoCard {
                len: repo.line_names()?.len(),
                tags: repo.meta().tags(),
                name,
            })
        })
        .collect()
}

/// Describes one repo and its lines.
///
/// # Endpoint
/// `POST /v1/repo`
///
/// # Request Body
/// ```json
/// {"repo": "repo_1"}
/// ```
///
/// # Errors
/// - **400 Bad Request**: Malformed body
/// - **404 Not Found**: Repo does not exist
pub fn repo(body: &[u8], state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let spec: RepoPathSpec = parse_json_body(body)?;
    let ws = state.open_workspace()?;
    let repo = ws.repo(&spec.repo).map_err(map_meta_error_to_router_error)?;

    let mut lines = Vec::new();
    for name in repo.line_names().map_err(map_meta_error_to_router_error)? {
        let line = repo.line(&name).map_err(map_meta_error_to_router_error)?;
        lines.push(LineRow {
            len: line.len(),
            r#type: line.kind(),
            tags: line.meta().tags(),
            created_at: line.created_at(),
            updated_at: line.updated_at(),
            name,
        });
    }

    json_response(&RepoResponse {
        name: repo.name().to_string(),
        len: lines.len(),
        tags: repo.meta().tags(),
        comments: repo.meta().comments(),
        lines,
    })
}

/// Adds a comment to the workspace, a repo, a line or an item.
///
/// # Endpoint
/// `POST /v1/add_comment`
///
/// # Request Body
/// ```json
/// {"comment": "looks good", "path_parts": ["repo_1", "00000", "00003"]}
/// ```
///
/// # Response
/// - **200 OK**: The stored comment with its assigned id
///
/// # Errors
/// - **400 Bad Request**: Empty comment or too many path parts
/// - **404 Not Found**: Addressed node does not exist
pub fn add_comment(body: &[u8], state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let request: AddCommentRequest = parse_json_body(body)?;
    let ws = state.open_workspace()?;
    let comment = ws
        .add_comment(&request.path_parts, &request.comment)
        .map_err(map_meta_error_to_router_error)?;
    json_response(&comment)
}

/// Reports the server version and the tracking library version recorded
/// in the workspace. An unreadable workspace reports a null library version.
///
/// # Endpoint
/// `GET /v1/version`
pub fn version(state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let cascade_ml_version = match state.open_workspace() {
        Ok(ws) => ws.meta().get_str("cascade_version").map(str::to_string),
        Err(err) => {
            tracing::debug!("No tracking library version, workspace unavailable: {}", err);
            None
        }
    };

    json_response(&VersionResponse {
        cascade_ml_version,
        cascade_ui_version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
