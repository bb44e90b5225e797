//! Workspace traversal, validation and comment writes.

use std::fs;

use ntest::timeout;
use serde_json::json;

use cascade_view_core::error::MetaError;
use cascade_view_core::store::{ItemSource, LineKind, Workspace};

use super::helpers::{model_meta, write_meta, TestWorkspace};

#[timeout(2000)]
#[test]
fn test_open_rejects_non_workspace_roots() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Workspace::open(dir.path()).unwrap_err(),
        MetaError::InvalidWorkspace { .. }
    ));

    write_meta(dir.path(), json!([{"type": "repo"}]));
    let err = Workspace::open(dir.path()).unwrap_err();
    assert!(err.to_string().contains("not a workspace"));

    assert!(Workspace::open(dir.path().join("missing")).is_err());
}

#[timeout(2000)]
#[test]
fn test_open_resolves_root_to_absolute_path() {
    let ws = TestWorkspace::new();
    ws.add_repo("repo");
    let dir_name = ws.root().file_name().unwrap().to_str().unwrap().to_string();

    let workspace = Workspace::open(ws.root().join("repo").join("..")).unwrap();
    assert!(workspace.root().is_absolute());
    assert_eq!(workspace.name(), dir_name);

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(ws.root()).unwrap();
    let relative = Workspace::open(".");
    std::env::set_current_dir(previous).unwrap();

    let relative = relative.unwrap();
    assert!(relative.root().is_absolute());
    assert!(relative.name().starts_with("ws"));
    assert_eq!(relative.name(), dir_name);
    assert_eq!(relative.repo("repo").unwrap().path(), relative.root().join("repo"));
}

#[timeout(2000)]
#[test]
fn test_traverse_repos_lines_items() {
    let ws = TestWorkspace::new();
    ws.add_repo("repo_b");
    ws.add_repo("repo_a");
    ws.add_line("repo_a", "00000", "model_line");
    ws.add_item("repo_a", "00000", "00000", Some(model_meta("2024-01-01", 0.1, None)));
    ws.add_item("repo_a", "00000", "00001", Some(model_meta("2024-01-02", 0.2, Some(0.7))));
    // A plain directory without metadata is not a repo
    fs::create_dir_all(ws.root().join("scratch")).unwrap();

    let workspace = Workspace::open(ws.root()).unwrap();
    assert_eq!(workspace.repo_names().unwrap(), vec!["repo_a", "repo_b"]);
    assert_eq!(workspace.meta().tags(), vec!["main"]);

    let repo = workspace.repo("repo_a").unwrap();
    assert_eq!(repo.line_names().unwrap(), vec!["00000"]);

    let line = repo.line("00000").unwrap();
    assert_eq!(line.kind(), LineKind::Model);
    assert_eq!(line.len(), 2);
    assert_eq!(line.item_names(), vec!["00000", "00001"]);
    assert_eq!(line.updated_at().as_deref(), Some("2024-01-02"));
    assert_eq!(line.created_at().as_deref(), Some("2024-01-01T00:00:00"));
}

#[timeout(2000)]
#[test]
fn test_missing_nodes_are_not_found() {
    let ws = TestWorkspace::new();
    ws.add_repo("repo");
    let workspace = Workspace::open(ws.root()).unwrap();

    assert!(matches!(
        workspace.repo("nope").unwrap_err(),
        MetaError::RepoNotFound { .. }
    ));
    assert!(matches!(
        workspace.line("repo", "nope").unwrap_err(),
        MetaError::LineNotFound { .. }
    ));
    assert!(matches!(
        workspace.repo("..").unwrap_err(),
        MetaError::InvalidRequest(_)
    ));
}

#[timeout(2000)]
#[test]
fn test_data_line_names_items_by_version() {
    let ws = TestWorkspace::new();
    ws.add_repo("data");
    ws.add_line("data", "images", "data_line");
    ws.add_item("data", "images", "00000", Some(json!({"saved_at": "a", "version": "0.1"})));
    ws.add_item("data", "images", "00001", Some(json!({"saved_at": "b"})));

    let line = Workspace::open(ws.root()).unwrap().line("data", "images").unwrap();
    assert_eq!(line.kind(), LineKind::Data);
    assert_eq!(line.item_names(), vec!["0.1", "00001"]);
    assert_eq!(line.find_item("0.1").unwrap(), 0);
    assert!(line.expect_kind(LineKind::Model).is_err());
}

#[timeout(2000)]
#[test]
fn test_item_files_and_run_artifacts() {
    let ws = TestWorkspace::new();
    ws.add_repo("repo");
    ws.add_line("repo", "line", "model_line");
    let item = ws.add_item("repo", "line", "00000", Some(model_meta("a", 0.1, None)));
    fs::create_dir_all(item.join("files")).unwrap();
    fs::create_dir_all(item.join("artifacts")).unwrap();
    fs::write(item.join("files").join("cascade_run.log"), "epoch 1\n").unwrap();
    fs::write(item.join("files").join("cascade_config.json"), r#"{"lr": 0.1}"#).unwrap();
    fs::write(item.join("artifacts").join("model.pkl"), vec![0u8; 2048]).unwrap();

    let line = Workspace::open(ws.root()).unwrap().line("repo", "line").unwrap();
    assert_eq!(line.run_log(0).unwrap().as_deref(), Some("epoch 1\n"));

    let (config, overrides) = line.run_config(0).unwrap();
    assert_eq!(config, Some(json!({"lr": 0.1})));
    assert_eq!(overrides, None);

    let artifacts = line.item_artifacts(0).unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].name, "model.pkl");
    assert_eq!(artifacts[0].size, 2048);
    assert_eq!(line.item_files(0).unwrap().len(), 2);

    assert!(matches!(
        line.run_log(5).unwrap_err(),
        MetaError::ItemNotFound { .. }
    ));
}

#[timeout(2000)]
#[test]
fn test_add_comment_at_each_level() {
    let ws = TestWorkspace::new();
    ws.add_repo("repo");
    ws.add_line("repo", "line", "model_line");
    ws.add_item("repo", "line", "00000", Some(model_meta("a", 0.1, None)));

    let workspace = Workspace::open(ws.root()).unwrap();
    let first = workspace.add_comment(&[], "workspace note").unwrap();
    let second = workspace.add_comment(&[], "another").unwrap();
    assert_eq!(first.id, "1");
    assert_eq!(second.id, "2");

    let parts = vec!["repo".to_string(), "line".to_string(), "00000".to_string()];
    let comment = workspace.add_comment(&parts, "good model").unwrap();
    assert_eq!(comment.message, "good model");

    // Re-open: nothing is cached, the write is visible
    let line = Workspace::open(ws.root()).unwrap().line("repo", "line").unwrap();
    let comments = line.load_item_meta(0).unwrap().comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].message, "good model");

    let reopened = Workspace::open(ws.root()).unwrap();
    assert_eq!(reopened.meta().comments().len(), 2);

    assert!(workspace.add_comment(&parts, "   ").is_err());
    let too_deep: Vec<String> = (0..4).map(|i| i.to_string()).collect();
    assert!(matches!(
        workspace.add_comment(&too_deep, "x").unwrap_err(),
        MetaError::InvalidRequest(_)
    ));
}

#[timeout(10000)]
#[test]
fn test_concurrent_comment_writers_never_fail() {
    let ws = TestWorkspace::new();
    let workspace = Workspace::open(ws.root()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let workspace = workspace.clone();
            std::thread::spawn(move || {
                (0..10)
                    .map(|i| workspace.add_comment(&[], &format!("note {} {}", t, i)))
                    .filter(Result::is_err)
                    .count()
            })
        })
        .collect();
    let failures: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(failures, 0);

    // Updates may be lost without locking, but the file stays readable
    let reopened = Workspace::open(ws.root()).unwrap();
    assert!(!reopened.meta().comments().is_empty());
    let leftovers: Vec<_> = fs::read_dir(ws.root())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name != "meta.json")
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
}
