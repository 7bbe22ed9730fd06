//! Source object graph read by the extractor
//!
//! The graph is read-only from the extractor's point of view. Documents use
//! the tabular model definition JSON layout (a database object with a nested
//! `model`).

mod tom;

use std::path::Path;

use anyhow::Result;

use crate::error::DaxModelError;
use crate::util::{read_file_with_encoding_fallback, strip_bom};

pub use tom::*;

/// Parse a database definition document
pub fn parse_database(text: &str) -> serde_json::Result<Database> {
    serde_json::from_str(strip_bom(text))
}

/// Load a database definition document from disk.
///
/// A database without a `name` takes the file stem as its name.
pub fn load_database(path: &Path) -> Result<Database> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| DaxModelError::SourceReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut database = parse_database(&content).map_err(|e| DaxModelError::SourceParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if database.name.is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            database.name = stem.to_string();
        }
    }

    Ok(database)
}
