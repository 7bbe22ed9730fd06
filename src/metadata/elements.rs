//! Metadata entity types

use serde::Serialize;

use super::{DaxExpression, DaxName, DaxNote};

/// Position of a table in [`super::DaxModel::tables`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TableId(pub usize);

/// Position of a column in [`Table::columns`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ColumnId(pub usize);

/// Association with a column of some table in the same model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnRef {
    pub table: TableId,
    pub column: ColumnId,
}

/// How a table gets its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TableSourceType {
    #[default]
    Ordinary,
    CalculatedTable,
    CalculationGroup,
}

/// Storage mode of a model or partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PartitionMode {
    #[default]
    Import,
    DirectQuery,
    Default,
    Push,
    Dual,
    DirectLake,
}

/// Table element
#[derive(Debug, Clone, Default, Serialize)]
pub struct Table {
    pub table_name: DaxName,
    pub is_hidden: bool,
    pub is_private: bool,
    /// Inferred during extraction, never read from the source
    pub is_date_table: bool,
    pub is_local_date_table: bool,
    pub is_template_date_table: bool,
    pub table_type: TableSourceType,
    /// Defining expression of a calculated table
    pub table_expression: Option<DaxExpression>,
    pub description: DaxNote,
    pub columns: Vec<Column>,
    pub measures: Vec<Measure>,
    pub user_hierarchies: Vec<UserHierarchy>,
    pub calculation_group: Option<CalculationGroup>,
}

impl Table {
    pub fn new(name: impl Into<DaxName>) -> Self {
        Self {
            table_name: name.into(),
            ..Default::default()
        }
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.0]
    }

    /// First column with the given name
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.column_name == name)
    }

    pub fn measure_by_name(&self, name: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.measure_name == name)
    }
}

/// Column element
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    /// Owning table
    pub table: TableId,
    pub column_name: DaxName,
    pub data_type: String,
    pub is_hidden: bool,
    pub encoding_hint: String,
    pub is_available_in_mdx: bool,
    pub is_key: bool,
    pub is_nullable: bool,
    pub is_unique: bool,
    pub keep_unique_rows: bool,
    /// Sort-by column, referenced by name only
    pub sort_by_column_name: DaxName,
    pub is_row_number: bool,
    pub state: String,
    pub column_type: String,
    /// Set only for calculated columns
    pub column_expression: Option<DaxExpression>,
    /// `Some(false)` when the source reports an explicitly named calculated-table column
    pub is_name_inferred: Option<bool>,
    pub source_column: DaxName,
    pub group_by_columns: Vec<DaxName>,
    pub display_folder: DaxNote,
    pub format_string: Option<String>,
    pub description: DaxNote,
    pub is_calculation_group_attribute: bool,
}

impl Column {
    pub fn new(table: TableId, name: impl Into<DaxName>) -> Self {
        Self {
            table,
            column_name: name.into(),
            data_type: String::new(),
            is_hidden: false,
            encoding_hint: String::new(),
            is_available_in_mdx: true,
            is_key: false,
            is_nullable: true,
            is_unique: false,
            keep_unique_rows: false,
            sort_by_column_name: DaxName::default(),
            is_row_number: false,
            state: String::new(),
            column_type: String::new(),
            column_expression: None,
            is_name_inferred: None,
            source_column: DaxName::default(),
            group_by_columns: Vec::new(),
            display_folder: DaxNote::default(),
            format_string: None,
            description: DaxNote::default(),
            is_calculation_group_attribute: false,
        }
    }
}

/// Measure element
#[derive(Debug, Clone, Serialize)]
pub struct Measure {
    pub table: TableId,
    pub measure_name: DaxName,
    pub measure_expression: Option<DaxExpression>,
    pub format_string_expression: Option<DaxExpression>,
    pub format_string: Option<String>,
    pub data_type: String,
    pub is_hidden: bool,
    pub display_folder: DaxNote,
    pub description: DaxNote,
    pub detail_rows_expression: Option<DaxExpression>,
    pub kpi_status_expression: Option<DaxExpression>,
    pub kpi_target_expression: Option<DaxExpression>,
    pub kpi_target_format_string: Option<String>,
    pub kpi_trend_expression: Option<DaxExpression>,
}

/// Relationship between two columns of the same model
///
/// The endpoints are associations: the columns stay owned by their tables.
#[derive(Debug, Clone, Serialize)]
pub struct Relationship {
    pub name: String,
    pub from_column: ColumnRef,
    pub to_column: ColumnRef,
    pub from_cardinality_type: String,
    pub to_cardinality_type: String,
    pub is_active: bool,
    pub rely_on_referential_integrity: bool,
    pub cross_filtering_behavior: String,
    pub security_filtering_behavior: String,
    pub join_on_date_behavior: String,
    pub relationship_type: String,
}

/// User-defined hierarchy
#[derive(Debug, Clone, Serialize)]
pub struct UserHierarchy {
    pub table: TableId,
    pub hierarchy_name: DaxName,
    pub is_hidden: bool,
    /// Level columns, top level first
    pub levels: Vec<ColumnId>,
}

impl UserHierarchy {
    /// Level columns resolved against the owning table
    pub fn level_columns<'a>(&'a self, table: &'a Table) -> impl Iterator<Item = &'a Column> {
        self.levels.iter().map(move |id| table.column(*id))
    }
}

/// Calculation group attached to a table
#[derive(Debug, Clone, Serialize)]
pub struct CalculationGroup {
    pub table: TableId,
    pub precedence: i32,
    pub calculation_items: Vec<CalculationItem>,
}

/// Calculation item
#[derive(Debug, Clone, Serialize)]
pub struct CalculationItem {
    pub item_name: DaxName,
    pub item_expression: Option<DaxExpression>,
    pub format_string_definition: Option<DaxExpression>,
    pub state: String,
    pub error_message: Option<String>,
    pub format_string_state: Option<String>,
    pub format_string_error_message: Option<String>,
    pub description: DaxNote,
}

/// Security role
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    pub role_name: DaxName,
    pub table_permissions: Vec<TablePermission>,
}

/// Row filter a role applies to one table
#[derive(Debug, Clone, Serialize)]
pub struct TablePermission {
    pub table: TableId,
    pub filter_expression: Option<DaxExpression>,
}
