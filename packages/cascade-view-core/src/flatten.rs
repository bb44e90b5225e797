//! Metadata flattening.
//!
//! Turns the nested layer 0 of a record into single-level dotted keys and
//! folds metric entries into synthetic `metrics.*` scalar columns.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::meta::MetadataRecord;

/// Separator between nested key path segments.
pub const SEPARATOR: char = '.';

/// Prefix of every synthesized metric column.
pub const METRICS_PREFIX: &str = "metrics";

/// Top-level keys kept whole instead of descended into.
const UNFLATTENED_KEYS: [&str; 2] = ["tags", METRICS_PREFIX];

/// Flattened record, keyed by dotted path.
pub type FlatMeta = BTreeMap<String, Value>;

/// Flattens the authoritative layer of a record.
///
/// Nested objects are joined with [`SEPARATOR`]; every other value is a
/// leaf, lists included. `tags` stays a list. `metrics` is removed and each
/// entry becomes `metrics.<column key>` holding the entry's `value`, or
/// null when the entry has none. When two entries resolve to the same
/// column the later one wins.
pub fn flatten(record: &MetadataRecord) -> FlatMeta {
    let mut flat = FlatMeta::new();
    for (key, value) in record.current() {
        if UNFLATTENED_KEYS.contains(&key.as_str()) {
            flat.insert(key.clone(), value.clone());
        } else {
            flatten_into(&mut flat, key.clone(), value);
        }
    }

    if let Some(metrics) = flat.remove(METRICS_PREFIX) {
        fold_metrics(&mut flat, &metrics);
    }
    flat
}

fn flatten_into(flat: &mut FlatMeta, path: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(flat, format!("{}{}{}", path, SEPARATOR, key), nested);
            }
        }
        leaf => {
            flat.insert(path, leaf.clone());
        }
    }
}

fn fold_metrics(flat: &mut FlatMeta, metrics: &Value) {
    match metrics {
        Value::Array(entries) => {
            for entry in entries {
                let Some(name) = entry.get("name").and_then(Value::as_str) else {
                    tracing::debug!("Skipping metric entry without a name: {}", entry);
                    continue;
                };
                let column = metric_column_key(
                    name,
                    entry.get("dataset").and_then(Value::as_str),
                    entry.get("split").and_then(Value::as_str),
                );
                let value = entry.get("value").cloned().unwrap_or(Value::Null);
                flat.insert(metric_field(&column), value);
            }
        }
        // Older records store metrics as a plain name -> value object
        Value::Object(legacy) => {
            for (name, value) in legacy {
                flat.insert(metric_field(name), value.clone());
            }
        }
        _ => {}
    }
}

fn metric_field(column: &str) -> String {
    format!("{}{}{}", METRICS_PREFIX, SEPARATOR, column)
}

/// Column key of a metric: the name, then `_<dataset>` and `_<split>` when
/// those are present and non-empty.
pub fn metric_column_key(name: &str, dataset: Option<&str>, split: Option<&str>) -> String {
    let mut key = name.to_string();
    for suffix in [dataset, split].into_iter().flatten() {
        if !suffix.is_empty() {
            key.push('_');
            key.push_str(suffix);
        }
    }
    key
}
