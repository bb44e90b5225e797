//! Line description, line tables and item search suggestions.

use std::collections::BTreeSet;

use hyper::{body::Bytes, Response};

use crate::router::{AppState, RouterError};
use cascade_view_core::store::{ItemSource, Line};
use cascade_view_core::table::summarize_items;
use cascade_view_core::{build_table, line_fields};

use super::request_utils::{
    json_response, map_meta_error_to_router_error, parse_json_body, LineItemTableRequest,
    LinePathSpec, SuggestionsRequest,
};
use super::response::{LineResponse, SuggestionsResponse};

fn open_line(spec: &LinePathSpec, state: &AppState) -> Result<Line, RouterError> {
    state
        .open_workspace()?
        .line(&spec.repo, &spec.line)
        .map_err(map_meta_error_to_router_error)
}

/// Describes a line: its items and the fields available as table columns.
///
/// # Endpoint
/// `POST /v1/line`
///
/// # Request Body
/// ```json
/// {"repo": "repo_1", "line": "00000"}
/// ```
///
/// # Response
/// - **200 OK**
/// ```json
/// {
///   "name": "00000",
///   "len": 2,
///   "type": "model_line",
///   "tags": [],
///   "comments": [],
///   "items": [{"name": "00000", "tags": [], "slug": "quiet_owl", "created_at": null, "saved_at": "..."}],
///   "item_fields": ["metrics.acc", "params.lr"]
/// }
/// ```
///
/// # Notes
/// - Items without metadata are left out of `items`; `len` still counts them
/// - `item_fields` is sorted ascending
///
/// # Errors
/// - **404 Not Found**: Repo or line does not exist
pub fn line(body: &[u8], state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let spec: LinePathSpec = parse_json_body(body)?;
    let line = open_line(&spec, state)?;

    let items = summarize_items(&line).map_err(map_meta_error_to_router_error)?;
    let item_fields = line_fields(&line).map_err(map_meta_error_to_router_error)?;

    json_response(&LineResponse {
        name: line.name().to_string(),
        len: line.len(),
        r#type: line.kind(),
        tags: line.meta().tags(),
        comments: line.meta().comments(),
        items,
        item_fields,
    })
}

/// Builds the item table of a line for the requested columns.
///
/// # Endpoint
/// `POST /v1/line_item_table`
///
/// # Request Body
/// ```json
/// {
///   "line_path": {"repo": "repo_1", "line": "00000"},
///   "item_fields": ["params.lr", "metrics.acc"]
/// }
/// ```
///
/// # Response
/// - **200 OK**: One object per item with metadata, in line order. Every
///   object has exactly the requested keys; missing values are null.
/// ```json
/// [{"params.lr": 0.01, "metrics.acc": 0.9}, {"params.lr": null, "metrics.acc": null}]
/// ```
///
/// # Errors
/// - **404 Not Found**: Repo or line does not exist
pub fn line_item_table(body: &[u8], state: &AppState) -> Result<Response<Bytes>, RouterError> {
    let request: LineItemTableRequest = parse_json_body(body)?;
    let line = open_line(&request.line_path, state)?;

    let rows = build_table(&line, &request.item_fields).map_err(map_meta_error_to_router_error)?;
    tracing::debug!(
        "Built table for {}/{}: {} rows x {} fields",
        line.repo(),
        line.name(),
        rows.len(),
        request.item_fields.len()
    );
    json_response(&rows)
}

/// Suggests search terms for the items of a line.
///
/// # Endpoint
/// `POST /v1/search/item/suggestions`
///
/// # Request Body
/// ```json
/// {"line_path": {"repo": "repo_1", "line": "00000"}, "query": "acc"}
/// ```
///
/// # Notes
/// - Candidates are the line's table fields, item names and item tags
/// - Matching is a case-insensitive substring test; an empty query matches
///   everything
/// - Results are sorted, deduplicated and capped by configuration
pub fn item_search_suggestions(
    body: &[u8],
    state: &AppState,
) -> Result<Response<Bytes>, RouterError> {
    let request: SuggestionsRequest = parse_json_body(body)?;
    let line = open_line(&request.line_path, state)?;

    let mut candidates: BTreeSet<String> = line_fields(&line)
        .map_err(map_meta_error_to_router_error)?
        .into_iter()
        .collect();
    for item in summarize_items(&line).map_err(map_meta_error_to_router_error)? {
        candidates.extend(item.tags);
        candidates.insert(item.name);
    }

    let query = request.query.trim().to_lowercase();
    let suggestions = candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().contains(&query))
        .take(state.config.max_suggestions)
        .collect();

    json_response(&SuggestionsResponse { suggestions })
}
