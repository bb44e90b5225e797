//! I/O utilities for reading and writing workspace files.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::META_FILE;
use crate::error::MetaError;
use crate::meta::MetadataRecord;

/// Classifies I/O errors into specific MetaError variants.
pub fn classify_io_error(error: std::io::Error, context: &str) -> MetaError {
    match error.kind() {
        ErrorKind::PermissionDenied => {
            MetaError::PermissionDenied(format!("{}: {}", context, error))
        }
        _ => MetaError::IoError(format!("{}: {}", context, error)),
    }
}

/// Rejects names that would escape their parent directory.
pub fn validate_segment(name: &str) -> Result<(), MetaError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(MetaError::InvalidRequest(format!(
            "Invalid path segment '{}'",
            name
        )));
    }
    Ok(())
}

/// Reads `meta.json` in `dir`.
///
/// A missing or blank file, an empty layer list, or a non-object head
/// layer all yield [`MetaError::EmptyMeta`].
pub fn read_meta(dir: &Path) -> Result<MetadataRecord, MetaError> {
    let path = dir.join(META_FILE);
    let empty = || MetaError::EmptyMeta {
        path: path.display().to_string(),
    };

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(empty()),
        Err(e) => return Err(classify_io_error(e, "Failed to read metadata")),
    };
    if contents.trim().is_empty() {
        return Err(empty());
    }

    let value: Value = serde_json::from_str(&contents).map_err(|e| MetaError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    MetadataRecord::from_value(value).ok_or_else(empty)
}

/// Writes `meta.json` in `dir` through a temporary file and rename.
///
/// Each writer gets its own temporary file, so concurrent writers to the
/// same node never fail; the last rename wins.
pub fn write_meta(dir: &Path, record: &MetadataRecord) -> Result<(), MetaError> {
    let final_path = dir.join(META_FILE);

    let json = serde_json::to_string_pretty(record)
        .map_err(|e| MetaError::SerializationError(e.to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", META_FILE))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| classify_io_error(e, "Failed to create temporary metadata file"))?;
    temp.write_all(json.as_bytes())
        .map_err(|e| classify_io_error(e, "Failed to write temporary metadata file"))?;

    // Atomic rename
    temp.persist(&final_path)
        .map_err(|e| classify_io_error(e.error, "Failed to rename metadata file"))?;
    Ok(())
}

/// Reads a text file, `None` when it does not exist.
pub fn read_optional_text(path: &Path) -> Result<Option<String>, MetaError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(classify_io_error(
            e,
            &format!("Failed to read {}", path.display()),
        )),
    }
}

/// Reads a JSON file, `None` when it does not exist.
pub fn read_optional_json(path: &Path) -> Result<Option<Value>, MetaError> {
    match read_optional_text(path)? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| MetaError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Names of the subdirectories of `dir` that carry a `meta.json`, sorted.
pub fn list_node_dirs(dir: &Path) -> Result<Vec<String>, MetaError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| classify_io_error(e, &format!("Failed to list {}", dir.display())))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| classify_io_error(e, "Failed to read directory entry"))?;
        let path = entry.path();
        if path.is_dir() && path.join(META_FILE).is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Names of the subdirectories of `dir`, sorted.
pub fn list_dirs(dir: &Path) -> Result<Vec<String>, MetaError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| classify_io_error(e, &format!("Failed to list {}", dir.display())))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| classify_io_error(e, "Failed to read directory entry"))?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Regular files directly under `dir` with their sizes, sorted by name.
/// A missing directory lists as empty.
pub fn list_files(dir: &Path) -> Result<Vec<(String, u64)>, MetaError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(classify_io_error(
                e,
                &format!("Failed to list {}", dir.display()),
            ))
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| classify_io_error(e, "Failed to read directory entry"))?;
        let metadata = entry
            .metadata()
            .map_err(|e| classify_io_error(e, "Failed to stat file"))?;
        if metadata.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                files.push((name.to_string(), metadata.len()));
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Joins a validated child segment onto `dir`.
pub fn child_dir(dir: &Path, name: &str) -> Result<PathBuf, MetaError> {
    validate_segment(name)?;
    Ok(dir.join(name))
}
