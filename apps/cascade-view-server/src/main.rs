//! Web server for browsing a local experiment workspace.
//!
//! Validates the workspace on startup, then serves the read API and the
//! built UI until interrupted.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cascade_view_api::{router::Router, server::Server};
use cascade_view_core::config::ViewerConfig;
use cascade_view_core::store::Workspace;
use clap::Parser;
use tokio::signal;

/// Command-line arguments for the viewer server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workspace directory to serve
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Directory with the built web UI (index.html, assets/)
    #[arg(long)]
    web_dir: Option<PathBuf>,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    request_timeout_ms: u64,

    /// Maximum number of search suggestions returned
    #[arg(long, default_value_t = 20)]
    max_suggestions: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let workspace = match Workspace::open(&args.path) {
        Ok(workspace) => workspace,
        Err(e) => {
            tracing::error!("Cannot open workspace at {}: {}", args.path.display(), e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Serving workspace '{}' with {} repos",
        workspace.name(),
        workspace.repo_names()?.len()
    );

    let config = Arc::new(ViewerConfig {
        workspace_root: workspace.root().to_path_buf(),
        web_dir: args.web_dir.clone(),
        request_timeout_ms: args.request_timeout_ms,
        max_suggestions: args.max_suggestions,
    });
    if config.web_dir.is_none() {
        tracing::warn!("No --web-dir given, only the API will be served");
    }

    let router = Router::new(config);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, args.port))?;
    let server = Server::new(addr, router);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            tracing::error!("Server error: {}", e);
        }
    });

    signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c")?;
    tracing::info!("Shutting down server");
    server_handle.abort();

    Ok(())
}
