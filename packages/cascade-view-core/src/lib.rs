//! Core of the workspace viewer.
//!
//! Provides metadata flattening, line field derivation, line table
//! projection, and read access to the on-disk workspace layout.

pub mod config;
pub mod error;
pub mod fields;
pub mod flatten;
pub mod meta;
pub mod store;
pub mod table;

pub use fields::{eligible_fields, line_fields};
pub use flatten::{flatten, metric_column_key, FlatMeta};
pub use meta::MetadataRecord;
pub use table::{build_table, ItemTableRow};
