//! Shared fixtures for router tests.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use hyper::body::Bytes;
use hyper::{Request, Response};
use serde_json::{json, Value};
use tempfile::TempDir;

use cascade_view_api::router::Router;
use cascade_view_core::config::ViewerConfig;

pub fn write_meta(dir: &Path, layers: Value) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("meta.json"), serde_json::to_string(&layers).unwrap()).unwrap();
}

/// A workspace with one model line (three items, the middle one without
/// metadata) and one data line, plus a small built UI.
pub struct Fixture {
    pub workspace: TempDir,
    pub web: TempDir,
    pub router: Router,
}

impl Fixture {
    pub fn new() -> Self {
        let workspace = tempfile::tempdir().unwrap();
        let root = workspace.path();
        write_meta(
            root,
            json!([{"type": "workspace", "cascade_version": "0.14.0", "tags": [], "comments": []}]),
        );

        let repo = root.join("repo_1");
        write_meta(&repo, json!([{"type": "repo", "tags": ["vision"]}]));

        let line = repo.join("00000");
        write_meta(
            &line,
            json!([{"type": "model_line", "created_at": "2024-01-01T00:00:00"}]),
        );
        let first = line.join("00000");
        write_meta(
            &first,
            json!([{
                "name": "cascade.models.BasicModel",
                "slug": "quiet_owl",
                "saved_at": "2024-01-02T00:00:00",
                "created_at": "2024-01-02T00:00:00",
                "user": "tester",
                "tags": ["best"],
                "comments": [{"id": "1", "user": "u", "host": "h", "timestamp": "t", "message": "nice"}],
                "params": {"lr": 0.01},
                "metrics": [{"name": "acc", "value": 0.9, "direction": "up"}],
                "git_uncommitted_changes": ["train.py"]
            }]),
        );
        fs::create_dir_all(first.join("files")).unwrap();
        fs::write(first.join("files").join("cascade_run.log"), "epoch 1 done\n").unwrap();
        fs::write(
            first.join("files").join("cascade_config.json"),
            r#"{"lr": 0.01, "epochs": 3}"#,
        )
        .unwrap();
        fs::create_dir_all(first.join("artifacts")).unwrap();
        fs::write(first.join("artifacts").join("model.pkl"), vec![1u8; 1536]).unwrap();

        fs::create_dir_all(line.join("00001")).unwrap();
        write_meta(
            &line.join("00002"),
            json!([{"saved_at": "2024-01-03T00:00:00", "slug": "brave_fox", "params": {"bs": 32}}]),
        );

        let data_line = repo.join("images");
        write_meta(&data_line, json!([{"type": "data_line"}]));
        write_meta(
            &data_line.join("00000"),
            json!([{"saved_at": "2024-02-01", "version": "0.1", "name": "cascade.data.Wrapper", "cwd": "/work"}]),
        );

        let web = tempfile::tempdir().unwrap();
        fs::write(web.path().join("index.html"), "<html>ui</html>").unwrap();
        fs::create_dir_all(web.path().join("assets")).unwrap();
        fs::write(web.path().join("assets").join("app.js"), "console.log(1)").unwrap();

        let config = ViewerConfig {
            workspace_root: root.to_path_buf(),
            web_dir: Some(web.path().to_path_buf()),
            ..Default::default()
        };
        let router = Router::new(Arc::new(config));

        Self {
            workspace,
            web,
            router,
        }
    }

    pub async fn post(&self, path: &str, body: Value) -> Response<Bytes> {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .body(Bytes::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        self.send(req).await
    }

    pub async fn get(&self, path: &str) -> Response<Bytes> {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Bytes::new())
            .unwrap();
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Bytes>) -> Response<Bytes> {
        match self.router.route(req).await {
            Ok(response) => response,
            Err(err) => err.into(),
        }
    }
}

pub fn json_body(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}
