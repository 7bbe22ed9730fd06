//! Date-table inference
//!
//! A heuristic, recomputed on every extraction from the source structure.
//! Rules are checked in order and the first match wins.

use crate::source::{DataType, Model, RelationshipEndCardinality, Table};

/// Data category that marks a table as a date table
pub const TIME_DATA_CATEGORY: &str = "Time";

/// Which rule classified a table as a date table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTableRule {
    /// The table is explicitly categorized as `Time`
    DataCategory,
    /// A key column has a date/time data type
    DateKeyColumn,
    /// An active relationship reaches the table through a date/time column on its "one" side
    DateRelationship,
}

/// Classify `table`, a table of `model`
pub fn infer_date_table(model: &Model, table: &Table) -> Option<DateTableRule> {
    if table.data_category.as_deref() == Some(TIME_DATA_CATEGORY) {
        return Some(DateTableRule::DataCategory);
    }

    if table
        .columns
        .iter()
        .any(|c| c.is_key && c.data_type == DataType::DateTime)
    {
        return Some(DateTableRule::DateKeyColumn);
    }

    let reached_by_date_relationship = model.relationships.iter().any(|r| {
        r.is_active
            && (is_date_one_end(table, &r.to_table, &r.to_column, r.to_cardinality)
                || is_date_one_end(table, &r.from_table, &r.from_column, r.from_cardinality))
    });
    if reached_by_date_relationship {
        return Some(DateTableRule::DateRelationship);
    }

    None
}

fn is_date_one_end(
    table: &Table,
    end_table: &str,
    end_column: &str,
    cardinality: RelationshipEndCardinality,
) -> bool {
    end_table == table.name
        && cardinality == RelationshipEndCardinality::One
        && table
            .column_by_name(end_column)
            .is_some_and(|c| c.data_type == DataType::DateTime)
}
