//! Access to the workspace written by the tracking library.
//!
//! The on-disk layout is a tree of directories, each carrying a
//! `meta.json`:
//!
//! ```text
//! <workspace>/meta.json
//! <workspace>/<repo>/meta.json
//! <workspace>/<repo>/<line>/meta.json
//! <workspace>/<repo>/<line>/<item>/{meta.json, files/, artifacts/}
//! ```
//!
//! Handles are plain values opened per request; nothing is cached between
//! calls, so every open re-reads the disk.

pub mod io_utils;
pub mod memory;
pub mod workspace;

pub use workspace::{FileEntry, Line, LineKind, Repo, Workspace};

use crate::error::MetaError;
use crate::meta::MetadataRecord;

/// Name of the metadata file in every node directory.
pub const META_FILE: &str = "meta.json";

/// An ordered sequence of items with metadata, such as a line.
pub trait ItemSource {
    /// Number of items.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Item identifiers, parallel to metadata indices.
    fn item_names(&self) -> Vec<String>;

    /// Loads the metadata of item `index`.
    ///
    /// Fails with [`MetaError::EmptyMeta`] when the item exists but has no
    /// readable metadata.
    fn load_item_meta(&self, index: usize) -> Result<MetadataRecord, MetaError>;
}
