//! Field sets and tables built from on-disk lines.

use ntest::timeout;
use serde_json::json;

use cascade_view_core::store::Workspace;
use cascade_view_core::table::summarize_items;
use cascade_view_core::{build_table, line_fields};

use super::helpers::{model_meta, TestWorkspace};

fn fixture() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.add_repo("repo");
    ws.add_line("repo", "line", "model_line");
    ws.add_item("repo", "line", "00000", Some(model_meta("a", 0.01, Some(0.9))));
    ws.add_item("repo", "line", "00001", None);
    ws.add_item("repo", "line", "00002", Some(json!({"saved_at": "c"})));
    ws
}

#[timeout(2000)]
#[test]
fn test_line_fields_from_disk() {
    let ws = fixture();
    let line = Workspace::open(ws.root()).unwrap().line("repo", "line").unwrap();

    let fields = line_fields(&line).unwrap();
    assert_eq!(
        fields,
        vec![
            "description",
            "host",
            "metrics.acc_val_test",
            "params.lr",
            "python_version",
            "user"
        ]
    );
}

#[timeout(2000)]
#[test]
fn test_table_skips_item_without_metadata() {
    let ws = fixture();
    let line = Workspace::open(ws.root()).unwrap().line("repo", "line").unwrap();
    let fields = vec!["params.lr".to_string(), "metrics.acc_val_test".to_string()];

    let rows = build_table(&line, &fields).unwrap();
    assert_eq!(
        serde_json::to_value(&rows).unwrap(),
        json!([
            {"params.lr": 0.01, "metrics.acc_val_test": 0.9},
            {"params.lr": null, "metrics.acc_val_test": null}
        ])
    );

    let items = summarize_items(&line).unwrap();
    assert_eq!(items.len(), rows.len());
    assert_eq!(items[0].name, "00000");
    assert_eq!(items[1].name, "00002");
}

#[timeout(2000)]
#[test]
fn test_table_reflects_new_items_on_reopen() {
    let ws = fixture();
    let fields = vec!["params.lr".to_string()];

    let before = {
        let line = Workspace::open(ws.root()).unwrap().line("repo", "line").unwrap();
        build_table(&line, &fields).unwrap()
    };
    ws.add_item("repo", "line", "00003", Some(model_meta("d", 0.5, None)));
    let after = {
        let line = Workspace::open(ws.root()).unwrap().line("repo", "line").unwrap();
        build_table(&line, &fields).unwrap()
    };

    assert_eq!(before.len(), 2);
    assert_eq!(after.len(), 3);
    assert_eq!(after[2].get("params.lr"), Some(&json!(0.5)));
}
