//! Viewer configuration.

use std::path::PathBuf;

/// Viewer configuration.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Root directory of the workspace to browse
    pub workspace_root: PathBuf,
    /// Directory holding the built web UI (index.html, assets/)
    pub web_dir: Option<PathBuf>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum number of search suggestions returned
    pub max_suggestions: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("."),
            web_dir: None,
            request_timeout_ms: 5000, // 5 seconds default
            max_suggestions: 20,
        }
    }
}
