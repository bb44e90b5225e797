//! Workspace, repo and line handles over the on-disk layout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use super::io_utils::{
    child_dir, list_dirs, list_files, list_node_dirs, read_meta, read_optional_json,
    read_optional_text, write_meta,
};
use super::ItemSource;
use crate::error::MetaError;
use crate::meta::{Comment, MetadataRecord};

/// Run log written next to a model's files.
pub const RUN_LOG_FILE: &str = "cascade_run.log";
/// Resolved run configuration.
pub const RUN_CONFIG_FILE: &str = "cascade_config.json";
/// Command-line overrides of the run configuration.
pub const RUN_OVERRIDES_FILE: &str = "cascade_overrides.json";

const FILES_DIR: &str = "files";
const ARTIFACTS_DIR: &str = "artifacts";

fn dir_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

/// Root of a workspace.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    meta: MetadataRecord,
}

impl Workspace {
    /// Opens the workspace at `root`.
    ///
    /// The root must carry a `meta.json` whose head layer has
    /// `"type": "workspace"`. The root is resolved to an absolute path.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, MetaError> {
        let given = root.as_ref();
        if !given.is_dir() {
            return Err(MetaError::InvalidWorkspace {
                path: given.display().to_string(),
                reason: "directory does not exist".to_string(),
            });
        }
        let root = fs::canonicalize(given).map_err(|e| MetaError::InvalidWorkspace {
            path: given.display().to_string(),
            reason: format!("cannot resolve path: {}", e),
        })?;
        let invalid = |reason: String| MetaError::InvalidWorkspace {
            path: root.display().to_string(),
            reason,
        };

        let meta = match read_meta(&root) {
            Ok(meta) => meta,
            Err(MetaError::EmptyMeta { .. }) => {
                return Err(invalid("no metadata file at the root".to_string()))
            }
            Err(e) => return Err(invalid(e.to_string())),
        };
        match meta.get_str("type") {
            Some("workspace") => {}
            Some(other) => return Err(invalid(format!("root is a {}, not a workspace", other))),
            None => return Err(invalid("root metadata has no type".to_string())),
        }

        Ok(Self { root, meta })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> String {
        dir_name(&self.root)
    }

    pub fn meta(&self) -> &MetadataRecord {
        &self.meta
    }

    /// Repo directory names, sorted.
    pub fn repo_names(&self) -> Result<Vec<String>, MetaError> {
        list_node_dirs(&self.root)
    }

    /// Opens a repo by name.
    pub fn repo(&self, name: &str) -> Result<Repo, MetaError> {
        let path = child_dir(&self.root, name)?;
        if !path.is_dir() {
            return Err(MetaError::RepoNotFound {
                repo: name.to_string(),
            });
        }
        let meta = read_meta(&path).map_err(|e| match e {
            MetaError::EmptyMeta { .. } => MetaError::RepoNotFound {
                repo: name.to_string(),
            },
            other => other,
        })?;
        Ok(Repo {
            path,
            name: name.to_string(),
            meta,
        })
    }

    /// Opens a line by repo and line name.
    pub fn line(&self, repo: &str, line: &str) -> Result<Line, MetaError> {
        self.repo(repo)?.line(line)
    }

    /// Appends a comment to the node addressed by `path_parts`.
    ///
    /// Zero parts address the workspace, then repo, line and item names.
    /// Returns the stored comment.
    pub fn add_comment(&self, path_parts: &[String], message: &str) -> Result<Comment, MetaError> {
        if message.trim().is_empty() {
            return Err(MetaError::InvalidRequest(
                "Comment message is empty".to_string(),
            ));
        }

        let dir = match path_parts {
            [] => self.root.clone(),
            [repo] => self.repo(repo)?.path,
            [repo, line] => self.line(repo, line)?.path,
            [repo, line, item] => {
                let line = self.line(repo, line)?;
                let index = line.find_item(item)?;
                line.item_dir(index)?
            }
            _ => {
                return Err(MetaError::InvalidRequest(format!(
                    "Expected at most 3 path parts, got {}",
                    path_parts.len()
                )))
            }
        };

        let mut record = read_meta(&dir)?;
        let comment = new_comment(&record.comments(), message);
        record
            .push_comment(&comment)
            .map_err(|e| MetaError::SerializationError(e.to_string()))?;
        write_meta(&dir, &record)?;

        tracing::info!("Added comment {} to {}", comment.id, dir.display());
        Ok(comment)
    }
}

fn new_comment(existing: &[Comment], message: &str) -> Comment {
    let next_id = existing
        .iter()
        .filter_map(|c| c.id.parse::<u64>().ok())
        .max()
        .map_or(existing.len() as u64 + 1, |max| max + 1);

    Comment {
        id: next_id.to_string(),
        user: env_or_default(&["USER", "USERNAME"], "unknown"),
        host: env_or_default(&["HOSTNAME", "COMPUTERNAME"], "localhost"),
        timestamp: chrono::Local::now().to_rfc3339(),
        message: message.to_string(),
    }
}

fn env_or_default(keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| default.to_string())
}

/// A repository: a named group of lines.
#[derive(Debug, Clone)]
pub struct Repo {
    path: PathBuf,
    name: String,
    meta: MetadataRecord,
}

impl Repo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta(&self) -> &MetadataRecord {
        &self.meta
    }

    /// Line directory names, sorted.
    pub fn line_names(&self) -> Result<Vec<String>, MetaError> {
        list_node_dirs(&self.path)
    }

    /// Opens a line by name.
    pub fn line(&self, name: &str) -> Result<Line, MetaError> {
        let not_found = || MetaError::LineNotFound {
            repo: self.name.clone(),
            line: name.to_string(),
        };
        let path = child_dir(&self.path, name)?;
        if !path.is_dir() {
            return Err(not_found());
        }
        let meta = read_meta(&path).map_err(|e| match e {
            MetaError::EmptyMeta { .. } => not_found(),
            other => other,
        })?;
        let kind = LineKind::from_meta(&meta);
        let item_dirs = list_dirs(&path)?;

        Ok(Line {
            path,
            repo: self.name.clone(),
            name: name.to_string(),
            meta,
            kind,
            item_dirs,
        })
    }
}

/// What a line stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    #[serde(rename = "model_line")]
    Model,
    #[serde(rename = "data_line")]
    Data,
}

impl LineKind {
    /// Classifies a line from its metadata. Unknown lines are model lines.
    pub fn from_meta(meta: &MetadataRecord) -> Self {
        match meta.get_str("type") {
            Some("data_line") => LineKind::Data,
            Some("model_line") => LineKind::Model,
            Some("line") => match meta.get_str("item_type") {
                Some("dataset") | Some("data") => LineKind::Data,
                _ => LineKind::Model,
            },
            other => {
                tracing::warn!("Unknown line type {:?}, treating as model line", other);
                LineKind::Model
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Model => "model_line",
            LineKind::Data => "data_line",
        }
    }
}

/// A file stored with an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
}

/// A line: an append-only sequence of items.
///
/// The item directory list is read once when the line is opened, so indices
/// stay stable for the life of the handle.
#[derive(Debug, Clone)]
pub struct Line {
    path: PathBuf,
    repo: String,
    name: String,
    meta: MetadataRecord,
    kind: LineKind,
    item_dirs: Vec<String>,
}

impl Line {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta(&self) -> &MetadataRecord {
        &self.meta
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// Fails unless the line stores `expected` items.
    pub fn expect_kind(&self, expected: LineKind) -> Result<(), MetaError> {
        if self.kind != expected {
            return Err(MetaError::LineTypeMismatch {
                line: self.name.clone(),
                expected: expected.as_str(),
                actual: self.kind.as_str(),
            });
        }
        Ok(())
    }

    /// Directory of item `index`.
    pub fn item_dir(&self, index: usize) -> Result<PathBuf, MetaError> {
        self.item_dirs
            .get(index)
            .map(|dir| self.path.join(dir))
            .ok_or_else(|| MetaError::ItemNotFound {
                line: self.name.clone(),
                item: index.to_string(),
            })
    }

    /// Index of the item called `name`. A bare number that matches no name
    /// is taken as an index.
    pub fn find_item(&self, name: &str) -> Result<usize, MetaError> {
        if let Some(index) = self.item_names().iter().position(|n| n == name) {
            return Ok(index);
        }
        match name.parse::<usize>() {
            Ok(index) if index < self.item_dirs.len() => Ok(index),
            _ => Err(MetaError::ItemNotFound {
                line: self.name.clone(),
                item: name.to_string(),
            }),
        }
    }

    /// Creation time from the line metadata.
    pub fn created_at(&self) -> Option<String> {
        self.meta.get_str("created_at").map(str::to_string)
    }

    /// Last update time: the line's own `updated_at`, else the `saved_at`
    /// of the newest item that has metadata.
    pub fn updated_at(&self) -> Option<String> {
        if let Some(updated) = self.meta.get_str("updated_at") {
            return Some(updated.to_string());
        }
        (0..self.len())
            .rev()
            .find_map(|i| self.load_item_meta(i).ok())
            .and_then(|meta| meta.get_str("saved_at").map(str::to_string))
    }

    /// Files stored under the item's `files/` directory.
    pub fn item_files(&self, index: usize) -> Result<Vec<FileEntry>, MetaError> {
        self.list_item_subdir(index, FILES_DIR)
    }

    /// Files stored under the item's `artifacts/` directory.
    pub fn item_artifacts(&self, index: usize) -> Result<Vec<FileEntry>, MetaError> {
        self.list_item_subdir(index, ARTIFACTS_DIR)
    }

    fn list_item_subdir(&self, index: usize, sub: &str) -> Result<Vec<FileEntry>, MetaError> {
        let dir = self.item_dir(index)?.join(sub);
        Ok(list_files(&dir)?
            .into_iter()
            .map(|(name, size)| FileEntry { name, size })
            .collect())
    }

    /// Text of the item's run log, `None` when it was not recorded.
    pub fn run_log(&self, index: usize) -> Result<Option<String>, MetaError> {
        let path = self.item_dir(index)?.join(FILES_DIR).join(RUN_LOG_FILE);
        read_optional_text(&path)
    }

    /// Run configuration and overrides of the item, each `None` when absent.
    pub fn run_config(&self, index: usize) -> Result<(Option<Value>, Option<Value>), MetaError> {
        let files = self.item_dir(index)?.join(FILES_DIR);
        let config = read_optional_json(&files.join(RUN_CONFIG_FILE))?;
        let overrides = read_optional_json(&files.join(RUN_OVERRIDES_FILE))?;
        Ok((config, overrides))
    }
}

impl ItemSource for Line {
    fn len(&self) -> usize {
        self.item_dirs.len()
    }

    /// Model items are named by directory; dataset items by their
    /// `version`, falling back to the directory.
    fn item_names(&self) -> Vec<String> {
        match self.kind {
            LineKind::Model => self.item_dirs.clone(),
            LineKind::Data => self
                .item_dirs
                .iter()
                .enumerate()
                .map(|(index, dir)| {
                    self.load_item_meta(index)
                        .ok()
                        .and_then(|meta| meta.get("version").map(version_name))
                        .unwrap_or_else(|| dir.clone())
                })
                .collect(),
        }
    }

    fn load_item_meta(&self, index: usize) -> Result<MetadataRecord, MetaError> {
        read_meta(&self.item_dir(index)?)
    }
}

fn version_name(version: &Value) -> String {
    match version {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
