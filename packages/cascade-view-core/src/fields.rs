//! Field-set derivation for line tables.

use std::collections::BTreeSet;

use crate::error::MetaError;
use crate::flatten::flatten;
use crate::meta::MetadataRecord;
use crate::store::ItemSource;

/// Key prefixes that never become table columns.
const EXCLUDED_PREFIXES: [&str; 3] = ["comments", "git_uncommitted_changes", "links"];

/// Keys rendered as fixed columns, not as dynamic fields.
const FIXED_COLUMNS: [&str; 5] = ["name", "slug", "tags", "saved_at", "created_at"];

/// Returns whether a flattened key may be shown as a table column.
pub fn is_eligible(key: &str) -> bool {
    !EXCLUDED_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
        && !FIXED_COLUMNS.contains(&key)
}

/// Flattened keys of one record that are eligible as table columns.
pub fn eligible_fields(record: &MetadataRecord) -> BTreeSet<String> {
    flatten(record)
        .into_keys()
        .filter(|key| is_eligible(key))
        .collect()
}

/// Union of eligible fields over every loadable item of a line, sorted
/// ascending. Items without metadata are skipped.
pub fn line_fields<S: ItemSource + ?Sized>(source: &S) -> Result<Vec<String>, MetaError> {
    let mut fields = BTreeSet::new();
    for index in 0..source.len() {
        match source.load_item_meta(index) {
            Ok(record) => fields.extend(eligible_fields(&record)),
            Err(e) if e.is_empty_meta() => {
                tracing::debug!("Skipping item {} while collecting fields: {}", index, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(fields.into_iter().collect())
}
