//! HTTP endpoint implementations for the viewer API and the web UI.
//!
//! Handlers are synchronous: the router runs them on the blocking pool
//! because every one of them reads the workspace from disk.

pub mod item_handlers;
pub mod line_handlers;
pub mod request_utils;
pub mod response;
pub mod static_handlers;
pub mod workspace_handlers;

pub use item_handlers::{dataset, model, run_config, run_log};
pub use line_handlers::{item_search_suggestions, line, line_item_table};
pub use response::error_response;
pub use static_handlers::{serve_asset, serve_index, serve_logo};
pub use workspace_handlers::{add_comment, repo, version, workspace};
