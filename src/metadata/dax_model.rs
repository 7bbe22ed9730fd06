//! Root of the extracted metadata graph

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DaxModelError;

use super::{Column, ColumnRef, PartitionMode, Role, Relationship, Table, TableId};

/// Name and version of a program taking part in an extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorInfo {
    pub name: String,
    pub version: String,
}

impl ExtractorInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Identity of this crate
    pub fn current() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// The complete extracted model
#[derive(Debug, Clone, Serialize)]
pub struct DaxModel {
    pub extractor_name: String,
    pub extractor_version: String,
    pub extractor_app: Option<String>,
    pub extractor_app_version: Option<String>,
    pub culture: Option<String>,
    pub compatibility_level: i64,
    pub compatibility_mode: Option<String>,
    pub default_mode: PartitionMode,
    pub last_processed: Option<DateTime<Utc>>,
    pub last_update: Option<DateTime<Utc>>,
    pub extraction_date: DateTime<Utc>,
    pub version: i64,
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub roles: Vec<Role>,
}

impl DaxModel {
    pub fn new(extractor: &ExtractorInfo, application: Option<&ExtractorInfo>) -> Self {
        Self {
            extractor_name: extractor.name.clone(),
            extractor_version: extractor.version.clone(),
            extractor_app: application.map(|a| a.name.clone()),
            extractor_app_version: application.map(|a| a.version.clone()),
            culture: None,
            compatibility_level: 0,
            compatibility_mode: None,
            default_mode: PartitionMode::default(),
            last_processed: None,
            last_update: None,
            extraction_date: Utc::now(),
            version: 0,
            tables: Vec::new(),
            relationships: Vec::new(),
            roles: Vec::new(),
        }
    }

    /// Id the next added table will receive
    pub fn next_table_id(&self) -> TableId {
        TableId(self.tables.len())
    }

    /// Append a table, keeping table names unique
    pub fn add_table(&mut self, table: Table) -> Result<TableId, DaxModelError> {
        if self.tables.iter().any(|t| t.table_name == table.table_name) {
            return Err(DaxModelError::DuplicateTable {
                name: table.table_name.to_string(),
            });
        }
        let id = self.next_table_id();
        self.tables.push(table);
        Ok(id)
    }

    pub fn table(&self, id: TableId) -> &Table {
        &self.tables[id.0]
    }

    pub fn column(&self, reference: ColumnRef) -> &Column {
        self.table(reference.table).column(reference.column)
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.table_name == name)
    }

    /// Name of a column qualified by its table, e.g. `'Sales'[Amount]`
    pub fn qualified_column_name(&self, reference: ColumnRef) -> String {
        format!(
            "'{}'[{}]",
            self.table(reference.table).table_name,
            self.column(reference).column_name
        )
    }
}
