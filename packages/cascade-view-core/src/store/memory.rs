//! In-memory item source, for tests and benchmarks.

use serde_json::Value;

use super::ItemSource;
use crate::error::MetaError;
use crate::meta::MetadataRecord;

/// A line held in memory. `None` entries behave like items without metadata.
#[derive(Debug, Clone, Default)]
pub struct MemoryLine {
    names: Vec<String>,
    items: Vec<Option<Value>>,
}

impl MemoryLine {
    /// Creates a line whose items are named `00000`, `00001`, ...
    pub fn new(items: Vec<Option<Value>>) -> Self {
        let names = (0..items.len()).map(|i| format!("{:05}", i)).collect();
        Self { names, items }
    }

    /// Creates a line with explicit item names.
    pub fn with_names(names: Vec<String>, items: Vec<Option<Value>>) -> Self {
        Self { names, items }
    }
}

impl ItemSource for MemoryLine {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn item_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn load_item_meta(&self, index: usize) -> Result<MetadataRecord, MetaError> {
        let name = self
            .names
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string());
        let value = self.items.get(index).ok_or_else(|| MetaError::ItemNotFound {
            line: "memory".to_string(),
            item: name.clone(),
        })?;
        value
            .clone()
            .and_then(MetadataRecord::from_value)
            .ok_or(MetaError::EmptyMeta { path: name })
    }
}
