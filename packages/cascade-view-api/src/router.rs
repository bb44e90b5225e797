//! Matchit routing configuration.

use std::sync::Arc;

use hyper::{body::Bytes, Method, Request, Response};
use matchit::Router as MatchitRouter;

use crate::{handlers, middleware};
use cascade_view_core::config::ViewerConfig;
use cascade_view_core::store::Workspace;

/// Shared application state.
///
/// Holds configuration only. The workspace is re-opened by every request
/// that needs it, so changes on disk are always visible.
#[derive(Clone)]
pub struct AppState {
    /// Viewer configuration
    pub config: Arc<ViewerConfig>,
}

impl AppState {
    /// Opens the configured workspace for the current request.
    pub fn open_workspace(&self) -> Result<Workspace, RouterError> {
        Workspace::open(&self.config.workspace_root)
            .map_err(handlers::request_utils::map_meta_error_to_router_error)
    }
}

/// HTTP request router.
pub struct Router {
    inner: MatchitRouter<RouteHandler>,
    state: AppState,
}

impl Router {
    /// Creates a new router with default routes.
    pub fn new(config: Arc<ViewerConfig>) -> Self {
        let mut router = MatchitRouter::new();

        let routes = [
            ("/v1/workspace", RouteHandler::Workspace),
            ("/v1/repo", RouteHandler::Repo),
            ("/v1/line", RouteHandler::Line),
            ("/v1/line_item_table", RouteHandler::LineItemTable),
            ("/v1/model", RouteHandler::Model),
            ("/v1/dataset", RouteHandler::Dataset),
            ("/v1/run_log", RouteHandler::RunLog),
            ("/v1/run_config", RouteHandler::RunConfig),
            ("/v1/add_comment", RouteHandler::AddComment),
            ("/v1/search/item/suggestions", RouteHandler::Suggestions),
            ("/v1/version", RouteHandler::Version),
            ("/assets/{*path}", RouteHandler::Asset),
            ("/logo.svg", RouteHandler::Logo),
        ];
        for (path, handler) in routes {
            router
                .insert(path, handler)
                .unwrap_or_else(|e| panic!("Failed to insert {} route: {}", path, e));
        }

        Self {
            inner: router,
            state: AppState { config },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Routes a request whose body has already been read.
    ///
    /// Handlers touch the filesystem, so they run on the blocking pool.
    pub async fn route(&self, req: Request<Bytes>) -> Result<Response<Bytes>, RouterError> {
        let path = req.uri().path().to_string();
        let method = req.method().clone();
        tracing::debug!("{} {}", method, path);

        if method == Method::OPTIONS {
            return middleware::preflight_response();
        }

        let (handler, asset_path) = match self.inner.at(&path) {
            Ok(matched) => (
                *matched.value,
                matched.params.get("path").map(str::to_string),
            ),
            Err(_) => {
                if method == Method::GET && is_ui_path(&path) {
                    (RouteHandler::Index, None)
                } else {
                    return not_found_response(&path);
                }
            }
        };

        if method != handler.method() {
            return Err(RouterError::MethodNotAllowed);
        }

        let state = self.state.clone();
        let body = req.into_body();
        tokio::task::spawn_blocking(move || handler.handle(&body, asset_path.as_deref(), &state))
            .await
            .map_err(|e| RouterError::InternalError(format!("Handler task failed: {}", e)))?
    }
}

/// Paths served by the single-page UI rather than the API.
fn is_ui_path(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    !path.starts_with("v1/") && !path.starts_with("assets/") && path != "favicon.ico"
}

fn not_found_response(path: &str) -> Result<Response<Bytes>, RouterError> {
    let error_response = handlers::error_response(
        404,
        "Not Found".to_string(),
        Some(format!("No route found for {}", path)),
    );
    let body = serde_json::to_vec(&error_response).map_err(|e| {
        RouterError::InternalError(format!("Failed to serialize error response: {}", e))
    })?;
    handlers::request_utils::build_response(404, body)
}

/// Route handler function.
#[derive(Debug, Clone, Copy)]
enum RouteHandler {
    Workspace,
    Repo,
    Line,
    LineItemTable,
    Model,
    Dataset,
    RunLog,
    RunConfig,
    AddComment,
    Suggestions,
    Version,
    Asset,
    Logo,
    Index,
}

impl RouteHandler {
    fn method(&self) -> Method {
        match self {
            RouteHandler::Version | RouteHandler::Asset | RouteHandler::Logo | RouteHandler::Index => {
                Method::GET
            }
            _ => Method::POST,
        }
    }

    fn handle(
        &self,
        body: &[u8],
        asset_path: Option<&str>,
        state: &AppState,
    ) -> Result<Response<Bytes>, RouterError> {
        match self {
            RouteHandler::Workspace => handlers::workspace(state),
            RouteHandler::Repo => handlers::repo(body, state),
            RouteHandler::Line => handlers::line(body, state),
            RouteHandler::LineItemTable => handlers::line_item_table(body, state),
            RouteHandler::Model => handlers::model(body, state),
            RouteHandler::Dataset => handlers::dataset(body, state),
            RouteHandler::RunLog => handlers::run_log(body, state),
            RouteHandler::RunConfig => handlers::run_config(body, state),
            RouteHandler::AddComment => handlers::add_comment(body, state),
            RouteHandler::Suggestions => handlers::item_search_suggestions(body, state),
            RouteHandler::Version => handlers::version(state),
            RouteHandler::Asset => handlers::serve_asset(asset_path.unwrap_or_default(), state),
            RouteHandler::Logo => handlers::serve_logo(state),
            RouteHandler::Index => handlers::serve_index(state),
        }
    }
}

/// Router error type.
#[derive(Debug)]
pub enum RouterError {
    MethodNotAllowed,
    InternalError(String),
    Timeout,
    BadRequest(String),
    NotFound(String),
}

impl RouterError {
    pub fn status(&self) -> u16 {
        match self {
            RouterError::MethodNotAllowed => 405,
            RouterError::InternalError(_) => 500,
            RouterError::Timeout => 408,
            RouterError::BadRequest(_) => 400,
            RouterError::NotFound(_) => 404,
        }
    }
}

impl std::fmt::Display for RouterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            RouterError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            RouterError::Timeout => write!(f, "Request Timeout"),
            RouterError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            RouterError::NotFound(msg) => write!(f, "Not Found: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {}

impl From<RouterError> for Response<Bytes> {
    fn from(err: RouterError) -> Self {
        let status = err.status();
        let message = match &err {
            RouterError::MethodNotAllowed => "Method Not Allowed",
            RouterError::InternalError(msg) => msg.as_str(),
            RouterError::Timeout => "Request Timeout",
            RouterError::BadRequest(msg) => msg.as_str(),
            RouterError::NotFound(msg) => msg.as_str(),
        };

        let error_response = handlers::error_response(status, message.to_string(), None);
        let body = serde_json::to_vec(&error_response)
            .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":{{\"code\":\"500\",\"message\":\"Failed to serialize error: {}\"}}}}", e).into_bytes());

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Bytes::from(body))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Bytes::from("Internal Server Error"));
                *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}
