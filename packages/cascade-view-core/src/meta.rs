//! Metadata records as written by the tracking library.
//!
//! A record on disk is a JSON array of layers. Layer 0 is the current,
//! authoritative one; the rest are kept verbatim so a record can be
//! written back without loss.

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Metadata of one workspace, repo, line or item.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRecord {
    current: Map<String, Value>,
    history: Vec<Value>,
}

impl MetadataRecord {
    /// Builds a record from its layers.
    ///
    /// Returns `None` when there is no layer or layer 0 is not an object,
    /// which callers treat as "no metadata".
    pub fn from_layers(layers: Vec<Value>) -> Option<Self> {
        let mut layers = layers.into_iter();
        match layers.next() {
            Some(Value::Object(current)) => Some(Self {
                current,
                history: layers.collect(),
            }),
            _ => None,
        }
    }

    /// Builds a record from a JSON value: either a layer array or a bare
    /// object taken as the only layer.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(layers) => Self::from_layers(layers),
            Value::Object(current) => Some(Self::single(current)),
            _ => None,
        }
    }

    /// Builds a record with a single layer.
    pub fn single(current: Map<String, Value>) -> Self {
        Self {
            current,
            history: Vec::new(),
        }
    }

    /// Authoritative layer.
    pub fn current(&self) -> &Map<String, Value> {
        &self.current
    }

    /// Older layers, oldest last.
    pub fn history(&self) -> &[Value] {
        &self.history
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.current.get(key)
    }

    /// String value of a layer-0 key; absent, null and non-string are `None`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.current.get(key).and_then(Value::as_str)
    }

    /// Tags attached to the record.
    pub fn tags(&self) -> Vec<String> {
        match self.current.get("tags") {
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Comments attached to the record. Malformed entries are dropped.
    pub fn comments(&self) -> Vec<Comment> {
        match self.current.get("comments") {
            Some(Value::Array(comments)) => comments
                .iter()
                .filter_map(|c| Comment::deserialize(c).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Typed metric entries. Entries that do not parse are dropped.
    pub fn metrics(&self) -> Vec<Metric> {
        match self.current.get("metrics") {
            Some(Value::Array(metrics)) => metrics
                .iter()
                .filter_map(|m| Metric::deserialize(m).ok())
                .collect(),
            Some(Value::Object(legacy)) => legacy
                .iter()
                .map(|(name, value)| Metric {
                    name: name.clone(),
                    value: value.as_f64(),
                    ..Metric::default()
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Appends a comment to layer 0.
    pub fn push_comment(&mut self, comment: &Comment) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(comment)?;
        match self.current.get_mut("comments") {
            Some(Value::Array(comments)) => comments.push(value),
            _ => {
                self.current
                    .insert("comments".to_string(), Value::Array(vec![value]));
            }
        }
        Ok(())
    }
}

impl Serialize for MetadataRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1 + self.history.len()))?;
        seq.serialize_element(&self.current)?;
        for layer in &self.history {
            seq.serialize_element(layer)?;
        }
        seq.end()
    }
}

/// A user comment on a workspace, repo, line or item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub timestamp: String,
    pub message: String,
}

/// Which way a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// One metric entry of an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default)]
    pub split: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub interval: Option<(f64, f64)>,
    #[serde(default)]
    pub extra: Option<Map<String, Value>>,
}
