//! rust-daxmodel: metadata extraction for tabular semantic models
//!
//! This library reads the object graph of a tabular model and produces a
//! self-contained metadata graph of its tables, columns, measures,
//! hierarchies, relationships, calculation groups and roles.

pub mod connection;
pub mod error;
pub mod extractor;
pub mod metadata;
pub mod source;
pub mod statistics;
pub mod util;

use anyhow::Result;
use tracing::{debug, info};

pub use connection::{Connector, FolderConnector, Server};
pub use error::DaxModelError;
pub use extractor::extract_model;
pub use metadata::{DaxModel, ExtractorInfo};
pub use statistics::{DmvCollector, NoStatistics, StatisticsCollector, StatisticsProviders};

/// Options controlling statistics collection after extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Query the data to compute statistics
    pub read_statistics_from_data: bool,
    /// Rows sampled per column; 0 disables sampling
    pub sample_rows: usize,
    /// Also query DirectQuery tables
    pub analyze_direct_query: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            read_statistics_from_data: true,
            sample_rows: 0,
            analyze_direct_query: false,
        }
    }
}

/// How to reach the database to extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionInfo {
    /// A full connection string; the database is its Initial Catalog
    ConnectionString(String),
    /// A server address (or connection string) and a database name
    Server { server: String, database: String },
}

/// Extract the model of a database and run the statistics collaborators on it.
///
/// The DMV collaborator always runs; the sampling collaborator only when
/// `options.read_statistics_from_data` is set. Both share one connection,
/// which is released before this function returns, whether or not they
/// succeed.
pub fn get_model<C: Connector>(
    connector: &C,
    connection_info: &ConnectionInfo,
    application: Option<&ExtractorInfo>,
    options: &ExtractOptions,
    providers: &StatisticsProviders<'_, C::Connection>,
) -> Result<DaxModel> {
    let (database, server_name, connection_string) = match connection_info {
        ConnectionInfo::ConnectionString(connection_string) => {
            let database =
                connection::resolve_database_from_connection_string(connector, connection_string)?;
            (
                database,
                connection::data_source(connection_string),
                connection_string.clone(),
            )
        }
        ConnectionInfo::Server { server, database } => (
            connection::resolve_database(connector, server, database)?,
            connection::data_source(server),
            connection::build_connection_string(server, database),
        ),
    };

    let tool = ExtractorInfo::current();
    let mut model = extract_model(Some(&database), Some(&tool), application)?;
    info!(
        database = %database.name,
        tables = model.tables.len(),
        relationships = model.relationships.len(),
        "extracted model"
    );

    {
        let mut statistics_connection = connector.open_connection(&connection_string)?;
        providers.dmv.populate_from_dmv(
            &mut model,
            &mut statistics_connection,
            &server_name,
            &database.name,
            &tool,
            application,
        )?;

        if options.read_statistics_from_data {
            providers.sampler.update_statistics(
                &mut model,
                &mut statistics_connection,
                options.sample_rows,
                options.analyze_direct_query,
            )?;
        } else {
            debug!("data statistics disabled");
        }
    }

    Ok(model)
}
