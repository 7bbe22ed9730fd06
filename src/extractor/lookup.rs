//! Name-based resolution against the extracted model
//!
//! References between entities are rebuilt from names after all tables and
//! columns exist. A name must match exactly one entity.

use std::collections::HashMap;

use crate::error::DaxModelError;
use crate::metadata::{ColumnId, ColumnRef, DaxModel, Table, TableId};

/// Outcome of looking a name up among candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup<T> {
    Found(T),
    Missing,
    Ambiguous(usize),
}

impl<T> Lookup<T> {
    fn from_matches(matches: &[T]) -> Self
    where
        T: Copy,
    {
        match matches {
            [] => Lookup::Missing,
            [single] => Lookup::Found(*single),
            many => Lookup::Ambiguous(many.len()),
        }
    }
}

/// Look a column up by name within one table
pub(crate) fn lookup_column(table: &Table, name: &str) -> Lookup<ColumnId> {
    let matches: Vec<ColumnId> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.column_name == name)
        .map(|(i, _)| ColumnId(i))
        .collect();
    Lookup::from_matches(&matches)
}

/// Resolve a column by name, failing on a miss or an ambiguous match
pub(crate) fn resolve_column(table: &Table, name: &str) -> Result<ColumnId, DaxModelError> {
    match lookup_column(table, name) {
        Lookup::Found(id) => Ok(id),
        Lookup::Missing => Err(DaxModelError::ColumnNotFound {
            table: table.table_name.to_string(),
            column: name.to_string(),
        }),
        Lookup::Ambiguous(count) => Err(DaxModelError::AmbiguousColumn {
            table: table.table_name.to_string(),
            column: name.to_string(),
            count,
        }),
    }
}

/// Table name index over a fully built model
pub(crate) struct TableIndex {
    by_name: HashMap<String, Vec<TableId>>,
}

impl TableIndex {
    pub(crate) fn new(model: &DaxModel) -> Self {
        let mut by_name: HashMap<String, Vec<TableId>> = HashMap::new();
        for (i, table) in model.tables.iter().enumerate() {
            by_name
                .entry(table.table_name.to_string())
                .or_default()
                .push(TableId(i));
        }
        Self { by_name }
    }

    pub(crate) fn lookup(&self, name: &str) -> Lookup<TableId> {
        self.by_name
            .get(name)
            .map(|ids| Lookup::from_matches(ids))
            .unwrap_or(Lookup::Missing)
    }

    pub(crate) fn resolve_table(&self, name: &str) -> Result<TableId, DaxModelError> {
        match self.lookup(name) {
            Lookup::Found(id) => Ok(id),
            Lookup::Missing => Err(DaxModelError::TableNotFound {
                name: name.to_string(),
            }),
            Lookup::Ambiguous(count) => Err(DaxModelError::AmbiguousTable {
                name: name.to_string(),
                count,
            }),
        }
    }

    pub(crate) fn resolve_column(
        &self,
        model: &DaxModel,
        table_name: &str,
        column_name: &str,
    ) -> Result<ColumnRef, DaxModelError> {
        let table = self.resolve_table(table_name)?;
        let column = resolve_column(model.table(table), column_name)?;
        Ok(ColumnRef { table, column })
    }
}
