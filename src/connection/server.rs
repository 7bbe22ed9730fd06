//! Server sessions and database resolution

use anyhow::Result;
use tracing::debug;

use crate::error::DaxModelError;
use crate::source::Database;

use super::ConnectionStringBuilder;

/// Opens sessions against a tabular server
pub trait Connector {
    type Server: Server;
    /// Query connection handed to the statistics collaborators. Dropping it
    /// releases the connection.
    type Connection;

    /// Connect to a server named by a connection string or a bare address
    fn connect(&self, server_or_connection_string: &str) -> Result<Self::Server>;

    fn open_connection(&self, connection_string: &str) -> Result<Self::Connection>;
}

/// An open server session
pub trait Server {
    /// Find a database by exact name. `None` covers both a missing database
    /// and one the session is not allowed to see.
    fn find_database_by_name(&self, name: &str) -> Result<Option<Database>>;
}

/// Connect to `server` and look up `database_name`
pub fn resolve_database<C: Connector>(
    connector: &C,
    server: &str,
    database_name: &str,
) -> Result<Database> {
    debug!(server, database = database_name, "resolving database");
    let session = connector.connect(server)?;
    find_database(&session, database_name)
}

/// Connect with `connection_string` and look up the database named by its Initial Catalog
pub fn resolve_database_from_connection_string<C: Connector>(
    connector: &C,
    connection_string: &str,
) -> Result<Database> {
    let database_name = ConnectionStringBuilder::try_parse(connection_string)
        .and_then(|b| b.initial_catalog().map(str::to_string))
        .ok_or_else(|| DaxModelError::MissingInitialCatalog {
            connection_string: connection_string.to_string(),
        })?;

    debug!(database = %database_name, "resolving database from connection string");
    let session = connector.connect(connection_string)?;
    find_database(&session, &database_name)
}

fn find_database<S: Server>(session: &S, database_name: &str) -> Result<Database> {
    session
        .find_database_by_name(database_name)?
        .ok_or_else(|| {
            DaxModelError::DatabaseNotFound {
                name: database_name.to_string(),
            }
            .into()
        })
}
