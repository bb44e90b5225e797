//! Integration tests over real on-disk workspaces.

pub mod helpers;
pub mod line_table_tests;
pub mod workspace_tests;
