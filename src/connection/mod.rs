//! Server connections and database resolution

mod connection_string;
mod folder;
mod server;

pub use connection_string::{
    build_connection_string, data_source, ConnectionStringBuilder, DATA_SOURCE_KEY,
    DEFAULT_PROVIDER, INITIAL_CATALOG_KEY, PROVIDER_KEY,
};
pub use folder::{FolderConnection, FolderConnector, FolderServer, MODEL_FILE_EXTENSION};
pub use server::{resolve_database, resolve_database_from_connection_string, Connector, Server};
