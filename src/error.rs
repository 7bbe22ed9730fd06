//! Error types for rust-daxmodel

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving and extracting a tabular model
#[derive(Error, Debug)]
pub enum DaxModelError {
    #[error(
        "The database '{name}' could not be found. Either it does not exist or you do not have admin rights to it."
    )]
    DatabaseNotFound { name: String },

    #[error("Connection string does not specify an Initial Catalog: {connection_string}")]
    MissingInitialCatalog { connection_string: String },

    #[error("Failed to connect to server '{server}': {message}")]
    ServerConnectError { server: String, message: String },

    #[error("Failed to read model file: {path}")]
    SourceReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model file: {path}")]
    SourceParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Table '{name}' appears more than once in the model")]
    DuplicateTable { name: String },

    #[error("Table '{name}' not found in the extracted model")]
    TableNotFound { name: String },

    #[error("Table name '{name}' is ambiguous ({count} matches)")]
    AmbiguousTable { name: String, count: usize },

    #[error("Column '{column}' not found in table '{table}'")]
    ColumnNotFound { table: String, column: String },

    #[error("Column name '{column}' is ambiguous in table '{table}' ({count} matches)")]
    AmbiguousColumn {
        table: String,
        column: String,
        count: usize,
    },

    #[error(
        "Level '{level}' of hierarchy '{hierarchy}' in table '{table}' refers to column '{column}', which has not been extracted"
    )]
    HierarchyLevelNotFound {
        table: String,
        hierarchy: String,
        level: String,
        column: String,
    },
}
