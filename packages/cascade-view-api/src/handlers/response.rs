//! Response types and helpers for HTTP endpoints.

use serde::Serialize;
use serde_json::{Map, Value};

use cascade_view_core::meta::{Comment, Metric};
use cascade_view_core::store::{FileEntry, LineKind};
use cascade_view_core::table::LineItemSummary;

/// Consistent API error response wrapper
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error code (HTTP status code as string)
    pub code: String,
    /// Error message
    pub message: String,
    /// Optional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Consistent error response wrapper
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false for error responses
    pub success: bool,
    /// Error information
    pub error: ApiError,
}

/// Helper to create error response
pub fn error_response(code: u16, message: String, details: Option<String>) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: ApiError {
            code: code.to_string(),
            message,
            details,
        },
    }
}

/// Repo entry of the workspace listing.
#[derive(Debug, Serialize)]
pub struct RepoCard {
    pub name: String,
    pub len: usize,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceResponse {
    pub name: String,
    pub len: usize,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
    pub repos: Vec<RepoCard>,
}

/// Line entry of the repo listing.
#[derive(Debug, Serialize)]
pub struct LineRow {
    pub name: String,
    pub len: usize,
    pub r#type: LineKind,
    pub tags: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RepoResponse {
    pub name: String,
    pub len: usize,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
    pub lines: Vec<LineRow>,
}

#[derive(Debug, Serialize)]
pub struct LineResponse {
    pub name: String,
    pub len: usize,
    pub r#type: LineKind,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
    /// Items with metadata, in line order
    pub items: Vec<LineItemSummary>,
    /// Sorted union of the displayable fields of all items
    pub item_fields: Vec<String>,
}

/// A stored file with a human-readable size.
#[derive(Debug, Serialize)]
pub struct FileView {
    pub name: String,
    pub size: String,
}

impl From<FileEntry> for FileView {
    fn from(entry: FileEntry) -> Self {
        Self {
            name: entry.name,
            size: format_size(entry.size),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub slug: Option<String>,
    pub path: String,
    pub created_at: Option<String>,
    pub saved_at: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub cwd: Option<String>,
    pub python_version: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
    pub params: Map<String, Value>,
    pub metrics: Vec<Metric>,
    pub artifacts: Vec<FileView>,
    pub files: Vec<FileView>,
    pub git_commit: Option<String>,
    pub git_uncommitted_changes: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub name: String,
    pub path: String,
    pub saved_at: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub cwd: Option<String>,
    pub python_version: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
    pub git_commit: Option<String>,
    pub git_uncommitted_changes: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    /// Version of the tracking library recorded in the workspace, if any
    pub cascade_ml_version: Option<String>,
    pub cascade_ui_version: String,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub log_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub config: Option<Value>,
    pub overrides: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

/// Formats a byte count with binary units, e.g. `1.5 KiB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}
