//! HTTP API for the workspace viewer.
//!
//! Provides the JSON endpoints the web UI calls, CORS handling,
//! static file serving for the built UI, and request routing.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;
