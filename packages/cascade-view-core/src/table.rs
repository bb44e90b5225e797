//! Line table projection.
//!
//! Rows and item summaries are produced by the same walk over a line, so
//! row `i` of a table always belongs to summary `i` of the same line.

use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::MetaError;
use crate::flatten::{flatten, FlatMeta};
use crate::meta::MetadataRecord;
use crate::store::ItemSource;

/// One table row: the requested fields, in request order, with null for
/// anything the item does not have.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTableRow {
    cells: Vec<(String, Value)>,
}

impl ItemTableRow {
    /// Projects a flattened record onto `fields`.
    pub fn project(flat: &FlatMeta, fields: &[String]) -> Self {
        let cells = fields
            .iter()
            .map(|field| {
                let value = flat.get(field).cloned().unwrap_or(Value::Null);
                (field.clone(), value)
            })
            .collect();
        Self { cells }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Field names in row order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for ItemTableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (field, value) in &self.cells {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

/// Summary of one item for the line listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemSummary {
    pub name: String,
    pub tags: Vec<String>,
    pub slug: Option<String>,
    pub created_at: Option<String>,
    pub saved_at: Option<String>,
}

impl LineItemSummary {
    fn from_record(name: String, record: &MetadataRecord) -> Self {
        Self {
            name,
            tags: record.tags(),
            slug: record.get_str("slug").map(str::to_string),
            created_at: record.get_str("created_at").map(str::to_string),
            saved_at: record.get_str("saved_at").map(str::to_string),
        }
    }
}

/// Removes repeated field names, keeping the first occurrence.
pub fn dedup_fields(fields: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .filter(|field| seen.insert(field.as_str()))
        .cloned()
        .collect()
}

/// Builds one row per item of a line, projected onto `fields`.
///
/// Items whose metadata is empty are skipped without breaking the walk.
/// Any other load failure is returned as is.
pub fn build_table<S: ItemSource + ?Sized>(
    source: &S,
    fields: &[String],
) -> Result<Vec<ItemTableRow>, MetaError> {
    let fields = dedup_fields(fields);
    let mut rows = Vec::with_capacity(source.len());
    for_each_loaded_item(source, |_, record| {
        rows.push(ItemTableRow::project(&flatten(record), &fields));
    })?;
    Ok(rows)
}

/// Lists the summaries of every item with metadata, in line order.
pub fn summarize_items<S: ItemSource + ?Sized>(
    source: &S,
) -> Result<Vec<LineItemSummary>, MetaError> {
    let names = source.item_names();
    let mut items = Vec::with_capacity(source.len());
    for_each_loaded_item(source, |index, record| {
        let name = names
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string());
        items.push(LineItemSummary::from_record(name, record));
    })?;
    Ok(items)
}

fn for_each_loaded_item<S, F>(source: &S, mut visit: F) -> Result<(), MetaError>
where
    S: ItemSource + ?Sized,
    F: FnMut(usize, &MetadataRecord),
{
    for index in 0..source.len() {
        match source.load_item_meta(index) {
            Ok(record) => visit(index, &record),
            Err(e) if e.is_empty_meta() => {
                tracing::debug!("Skipping item {}: {}", index, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryLine;
    use serde_json::json;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rows_are_aligned_with_nulls() {
        let line = MemoryLine::new(vec![
            Some(json!({
                "saved_at": "x",
                "params": {"lr": 0.01},
                "metrics": [{"name": "acc", "value": 0.9}]
            })),
            Some(json!({"saved_at": "y"})),
        ]);

        let rows = build_table(&line, &fields(&["params.lr", "metrics.acc"])).unwrap();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(
            json,
            json!([
                {"params.lr": 0.01, "metrics.acc": 0.9},
                {"params.lr": null, "metrics.acc": null}
            ])
        );
        for row in &rows {
            assert_eq!(row.fields().collect::<Vec<_>>(), vec!["params.lr", "metrics.acc"]);
        }
    }

    #[test]
    fn test_row_serialization_keeps_request_order() {
        let line = MemoryLine::new(vec![Some(json!({"saved_at": "x", "b": 2, "a": 1}))]);
        let rows = build_table(&line, &fields(&["b", "a"])).unwrap();
        let text = serde_json::to_string(&rows).unwrap();
        assert_eq!(text, r#"[{"b":2,"a":1}]"#);
    }

    #[test]
    fn test_skip_items_without_metadata() {
        let line = MemoryLine::new(vec![
            Some(json!({"saved_at": "a", "n": 0})),
            None,
            Some(json!({"saved_at": "c", "n": 2})),
        ]);

        let rows = build_table(&line, &fields(&["n"])).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("n"), Some(&json!(0)));
        assert_eq!(rows[1].get("n"), Some(&json!(2)));

        let items = summarize_items(&line).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["00000", "00002"]);
    }

    #[test]
    fn test_duplicate_fields_collapse() {
        let line = MemoryLine::new(vec![Some(json!({"saved_at": "a", "n": 1}))]);
        let rows = build_table(&line, &fields(&["n", "m", "n"])).unwrap();
        assert_eq!(rows[0].fields().collect::<Vec<_>>(), vec!["n", "m"]);
    }

    #[test]
    fn test_build_table_is_idempotent() {
        let line = MemoryLine::new(vec![
            Some(json!({"saved_at": "a", "metrics": [{"name": "acc", "value": 0.5}]})),
            Some(json!({"saved_at": "b", "params": {"lr": 1e-3}})),
        ]);
        let request = fields(&["metrics.acc", "params.lr", "missing"]);

        let first = serde_json::to_vec(&build_table(&line, &request).unwrap()).unwrap();
        let second = serde_json::to_vec(&build_table(&line, &request).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_field_request_yields_empty_rows() {
        let line = MemoryLine::new(vec![Some(json!({"saved_at": "a"}))]);
        let rows = build_table(&line, &[]).unwrap();
        assert_eq!(serde_json::to_string(&rows).unwrap(), "[{}]");
    }

    #[test]
    fn test_summaries_take_names_from_source() {
        let line = MemoryLine::with_names(
            fields(&["0.1", "0.2", "0.3"]),
            vec![
                Some(json!({"saved_at": "a"})),
                None,
                Some(json!({"saved_at": "c"})),
            ],
        );
        let items = summarize_items(&line).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["0.1", "0.3"]);
        assert_eq!(build_table(&line, &fields(&["saved_at"])).unwrap().len(), 2);
    }

    #[test]
    fn test_summary_optional_keys() {
        let line = MemoryLine::new(vec![Some(json!({
            "saved_at": "a",
            "slug": "quick_owl",
            "tags": ["best"]
        }))]);
        let items = summarize_items(&line).unwrap();
        assert_eq!(items[0].slug.as_deref(), Some("quick_owl"));
        assert_eq!(items[0].created_at, None);
        assert_eq!(items[0].tags, vec!["best"]);
    }
}
