//! Serving of the built web UI.

use std::path::{Path, PathBuf};

use hyper::{body::Bytes, Response};
use percent_encoding::percent_decode_str;

use crate::router::{AppState, RouterError};
use cascade_view_core::store::io_utils::validate_segment;

use super::request_utils::build_file_response;

const ASSETS_DIR: &str = "assets";
const INDEX_FILE: &str = "index.html";
const LOGO_FILE: &str = "logo.svg";

/// Content type for a file, by extension.
pub fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

fn web_dir(state: &AppState) -> Result<&Path, RouterError> {
    state
        .config
        .web_dir
        .as_deref()
        .ok_or_else(|| RouterError::NotFound("Web UI is not configured".to_string()))
}

/// Resolves a percent-encoded relative path under `base`, refusing any
/// segment that would leave it.
pub fn resolve_under(base: &Path, encoded: &str) -> Result<PathBuf, RouterError> {
    let decoded = percent_decode_str(encoded).decode_utf8_lossy();
    let mut path = base.to_path_buf();
    for segment in decoded.split('/').filter(|s| !s.is_empty()) {
        validate_segment(segment)
            .map_err(|_| RouterError::BadRequest(format!("Invalid asset path '{}'", decoded)))?;
        path.push(segment);
    }
    Ok(path)
}

fn serve_file(path: &Path) -> Result<Response<Bytes>, RouterError> {
    match std::fs::read(path) {
        Ok(contents) => build_file_response(content_type(path), contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RouterError::NotFound(
            format!("File not found: {}", path.display()),
        )),
        Err(e) => Err(RouterError::InternalError(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Serves a file from the UI's `assets/` directory.
///
/// # Endpoint
/// `GET /assets/{path}`
pub fn serve_asset(path: &str, state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let file = resolve_under(&web_dir(state)?.join(ASSETS_DIR), path)?;
    serve_file(&file)
}

/// Serves the UI logo.
///
/// # Endpoint
/// `GET /logo.svg`
pub fn serve_logo(state: &AppState) -> Result<Response<Bytes>, RouterError> {
    serve_file(&web_dir(state)?.join(LOGO_FILE))
}

/// Serves `index.html` for any UI route, letting the client-side router
/// take over.
pub fn serve_index(state: &AppState) -> Result<Response<Bytes>, RouterError> {
    serve_file(&web_dir(state)?.join(INDEX_FILE))
}
