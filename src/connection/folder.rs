//! Offline server backed by a folder of model definition files
//!
//! The data source is a directory; every `*.bim` file directly inside it is
//! one database. A database is named by its `name` field, or by the file stem
//! when the field is empty.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::DaxModelError;
use crate::source::{load_database, Database};

use super::{ConnectionStringBuilder, Connector, Server};

/// File extension of model definition files
pub const MODEL_FILE_EXTENSION: &str = "bim";

/// Connector whose servers are directories on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderConnector;

/// Session on one model folder
#[derive(Debug, Clone)]
pub struct FolderServer {
    root: PathBuf,
}

/// Statistics connection on a model folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderConnection {
    pub data_source: PathBuf,
    pub catalog: Option<String>,
}

impl FolderConnector {
    fn folder_for(&self, server_or_connection_string: &str) -> Result<PathBuf> {
        let builder =
            ConnectionStringBuilder::from_server_or_connection_string(server_or_connection_string);
        let data_source =
            builder
                .data_source()
                .ok_or_else(|| DaxModelError::ServerConnectError {
                    server: server_or_connection_string.to_string(),
                    message: "no Data Source specified".to_string(),
                })?;

        let root = PathBuf::from(data_source);
        if !root.is_dir() {
            return Err(DaxModelError::ServerConnectError {
                server: data_source.to_string(),
                message: "not a model folder".to_string(),
            }
            .into());
        }
        Ok(root)
    }
}

impl Connector for FolderConnector {
    type Server = FolderServer;
    type Connection = FolderConnection;

    fn connect(&self, server_or_connection_string: &str) -> Result<FolderServer> {
        let root = self.folder_for(server_or_connection_string)?;
        debug!(root = %root.display(), "connected to model folder");
        Ok(FolderServer { root })
    }

    fn open_connection(&self, connection_string: &str) -> Result<FolderConnection> {
        let data_source = self.folder_for(connection_string)?;
        let catalog = ConnectionStringBuilder::try_parse(connection_string)
            .and_then(|b| b.initial_catalog().map(str::to_string));
        Ok(FolderConnection {
            data_source,
            catalog,
        })
    }
}

impl FolderServer {
    /// Model files in the folder, sorted by file name
    fn model_files(&self) -> Vec<PathBuf> {
        walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(MODEL_FILE_EXTENSION))
            })
            .collect()
    }
}

impl Server for FolderServer {
    fn find_database_by_name(&self, name: &str) -> Result<Option<Database>> {
        for path in self.model_files() {
            let named_by_file = path.file_stem().and_then(|s| s.to_str()) == Some(name);

            let database = match load_database(&path) {
                Ok(database) => database,
                // The file meant by the caller has to load
                Err(e) if named_by_file => return Err(e),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable model file");
                    continue;
                }
            };

            if database.name == name || named_by_file {
                return Ok(Some(database));
            }
        }
        Ok(None)
    }
}
