//! Fixture builders for on-disk workspaces.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

/// Writes `layers` as the `meta.json` of `dir`, creating the directory.
pub fn write_meta(dir: &Path, layers: Value) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("meta.json"), serde_json::to_string(&layers).unwrap()).unwrap();
}

/// A temporary workspace with an empty root `meta.json`.
pub struct TestWorkspace {
    pub dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("ws")
            .tempdir()
            .unwrap();
        write_meta(
            dir.path(),
            json!([{"type": "workspace", "tags": ["main"], "comments": []}]),
        );
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn add_repo(&self, repo: &str) -> PathBuf {
        let path = self.root().join(repo);
        write_meta(&path, json!([{"type": "repo", "tags": []}]));
        path
    }

    pub fn add_line(&self, repo: &str, line: &str, line_type: &str) -> PathBuf {
        let path = self.root().join(repo).join(line);
        write_meta(
            &path,
            json!([{"type": line_type, "created_at": "2024-01-01T00:00:00"}]),
        );
        path
    }

    /// Adds an item directory; `None` leaves it without metadata.
    pub fn add_item(&self, repo: &str, line: &str, item: &str, meta: Option<Value>) -> PathBuf {
        let path = self.root().join(repo).join(line).join(item);
        fs::create_dir_all(&path).unwrap();
        if let Some(meta) = meta {
            write_meta(&path, json!([meta]));
        }
        path
    }
}

/// Metadata of a model item as the tracking library writes it.
pub fn model_meta(saved_at: &str, lr: f64, acc: Option<f64>) -> Value {
    let mut meta = json!({
        "saved_at": saved_at,
        "created_at": saved_at,
        "slug": format!("model_{}", saved_at),
        "name": "cascade.models.BasicModel",
        "user": "tester",
        "host": "box",
        "python_version": "3.11",
        "description": "baseline",
        "tags": ["baseline"],
        "comments": [],
        "params": {"lr": lr},
        "metrics": []
    });
    if let Some(acc) = acc {
        meta["metrics"] = json!([{"name": "acc", "value": acc, "dataset": "val", "split": "test"}]);
    }
    meta
}
