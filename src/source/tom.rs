//! Tabular object model types as found in a database definition document
//!
//! Field names follow the camelCase JSON of the tabular model definition
//! (`model.bim`). Only the properties the extractor reads are modeled; unknown
//! fields are ignored.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Expression text may be a single string or an array of lines
#[derive(Deserialize)]
#[serde(untagged)]
enum Lines {
    One(String),
    Many(Vec<String>),
}

fn multiline<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let lines = Option::<Lines>::deserialize(deserializer)?;
    Ok(lines.map(|l| match l {
        Lines::One(s) => s,
        Lines::Many(v) => v.join("\n"),
    }))
}

fn default_true() -> bool {
    true
}

/// Enum values print the way the tabular object model names them (`DateTime`, `OneDirection`)
macro_rules! display_as_variant {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Debug::fmt(self, f)
                }
            }
        )*
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    Automatic,
    String,
    Int64,
    Double,
    DateTime,
    Decimal,
    Boolean,
    Binary,
    Variant,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    #[default]
    Data,
    Calculated,
    RowNumber,
    CalculatedTableColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EncodingHint {
    #[default]
    Default,
    Hash,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectState {
    #[default]
    Ready,
    NoData,
    CalculationNeeded,
    SemanticError,
    EvaluationError,
    DependencyError,
    Incomplete,
    SyntaxError,
    ForceCalculationNeeded,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModeType {
    #[default]
    Import,
    DirectQuery,
    Default,
    Push,
    Dual,
    DirectLake,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompatibilityMode {
    #[serde(alias = "AnalysisServices")]
    AnalysisServices,
    #[serde(alias = "PowerBI")]
    PowerBI,
    #[serde(alias = "Excel")]
    Excel,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipEndCardinality {
    None,
    #[default]
    One,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrossFilteringBehavior {
    #[default]
    OneDirection,
    BothDirections,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityFilteringBehavior {
    #[default]
    OneDirection,
    BothDirections,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateTimeRelationshipBehavior {
    #[default]
    DateAndTime,
    DatePartOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipType {
    #[default]
    SingleColumn,
}

display_as_variant!(
    DataType,
    ColumnType,
    EncodingHint,
    ObjectState,
    ModeType,
    CompatibilityMode,
    RelationshipEndCardinality,
    CrossFilteringBehavior,
    SecurityFilteringBehavior,
    DateTimeRelationshipBehavior,
    RelationshipType,
);

/// A database hosted by a server: its model plus server-side properties
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub compatibility_level: i64,
    #[serde(default)]
    pub compatibility_mode: CompatibilityMode,
    #[serde(default)]
    pub last_processed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub model: Model,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub default_mode: ModeType,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub roles: Vec<ModelRole>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default, deserialize_with = "multiline")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub data_category: Option<String>,
    #[serde(default, deserialize_with = "multiline")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub hierarchies: Vec<Hierarchy>,
    #[serde(default)]
    pub partitions: Vec<Partition>,
    #[serde(default)]
    pub calculation_group: Option<CalculationGroup>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Table {
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn annotation(&self, name: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    #[serde(default)]
    pub source: Option<PartitionSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PartitionSource {
    Calculated {
        #[serde(default, deserialize_with = "multiline")]
        expression: Option<String>,
    },
    CalculationGroup,
    /// Query, M, entity and other data-bound sources
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(default, rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub encoding_hint: EncodingHint,
    #[serde(default = "default_true")]
    pub is_available_in_mdx: bool,
    #[serde(default)]
    pub is_key: bool,
    #[serde(default = "default_true")]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub keep_unique_rows: bool,
    #[serde(default)]
    pub sort_by_column: Option<String>,
    #[serde(default)]
    pub state: ObjectState,
    #[serde(default, deserialize_with = "multiline")]
    pub expression: Option<String>,
    /// Calculated-table columns only
    #[serde(default = "default_true")]
    pub is_name_inferred: bool,
    #[serde(default)]
    pub source_column: Option<String>,
    #[serde(default)]
    pub display_folder: Option<String>,
    #[serde(default)]
    pub format_string: Option<String>,
    #[serde(default, deserialize_with = "multiline")]
    pub description: Option<String>,
    #[serde(default)]
    pub related_column_details: Option<RelatedColumnDetails>,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            name: String::new(),
            column_type: ColumnType::default(),
            data_type: DataType::default(),
            is_hidden: false,
            encoding_hint: EncodingHint::default(),
            is_available_in_mdx: true,
            is_key: false,
            is_nullable: true,
            is_unique: false,
            keep_unique_rows: false,
            sort_by_column: None,
            state: ObjectState::default(),
            expression: None,
            is_name_inferred: true,
            source_column: None,
            display_folder: None,
            format_string: None,
            description: None,
            related_column_details: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedColumnDetails {
    #[serde(default)]
    pub group_by_columns: Vec<GroupByColumn>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupByColumn {
    pub grouping_column: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub name: String,
    #[serde(default, deserialize_with = "multiline")]
    pub expression: Option<String>,
    #[serde(default)]
    pub format_string: Option<String>,
    #[serde(default)]
    pub format_string_definition: Option<FormatStringDefinition>,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub display_folder: Option<String>,
    #[serde(default, deserialize_with = "multiline")]
    pub description: Option<String>,
    #[serde(default)]
    pub detail_rows_definition: Option<DetailRowsDefinition>,
    #[serde(default)]
    pub kpi: Option<Kpi>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatStringDefinition {
    #[serde(default, deserialize_with = "multiline")]
    pub expression: Option<String>,
    #[serde(default)]
    pub state: ObjectState,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailRowsDefinition {
    #[serde(default, deserialize_with = "multiline")]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    #[serde(default, deserialize_with = "multiline")]
    pub status_expression: Option<String>,
    #[serde(default, deserialize_with = "multiline")]
    pub target_expression: Option<String>,
    #[serde(default)]
    pub target_format_string: Option<String>,
    #[serde(default, deserialize_with = "multiline")]
    pub trend_expression: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    pub name: String,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Level {
    pub name: String,
    #[serde(default)]
    pub ordinal: i32,
    /// Name of a column of the owning table
    pub column: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationGroup {
    #[serde(default)]
    pub precedence: i32,
    #[serde(default)]
    pub calculation_items: Vec<CalculationItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationItem {
    pub name: String,
    #[serde(default, deserialize_with = "multiline")]
    pub expression: Option<String>,
    #[serde(default)]
    pub format_string_definition: Option<FormatStringDefinition>,
    #[serde(default)]
    pub state: ObjectState,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "multiline")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(default)]
    pub name: String,
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    #[serde(default = "many")]
    pub from_cardinality: RelationshipEndCardinality,
    #[serde(default)]
    pub to_cardinality: RelationshipEndCardinality,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub cross_filtering_behavior: CrossFilteringBehavior,
    #[serde(default)]
    pub security_filtering_behavior: SecurityFilteringBehavior,
    #[serde(default)]
    pub join_on_date_behavior: DateTimeRelationshipBehavior,
    #[serde(default)]
    pub rely_on_referential_integrity: bool,
    #[serde(default, rename = "type")]
    pub relationship_type: RelationshipType,
}

fn many() -> RelationshipEndCardinality {
    RelationshipEndCardinality::Many
}

impl Default for Relationship {
    fn default() -> Self {
        Self {
            name: String::new(),
            from_table: String::new(),
            from_column: String::new(),
            to_table: String::new(),
            to_column: String::new(),
            from_cardinality: RelationshipEndCardinality::Many,
            to_cardinality: RelationshipEndCardinality::One,
            is_active: true,
            cross_filtering_behavior: CrossFilteringBehavior::default(),
            security_filtering_behavior: SecurityFilteringBehavior::default(),
            join_on_date_behavior: DateTimeRelationshipBehavior::default(),
            rely_on_referential_integrity: false,
            relationship_type: RelationshipType::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRole {
    pub name: String,
    #[serde(default)]
    pub table_permissions: Vec<TablePermission>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePermission {
    /// Name of the secured table
    pub name: String,
    #[serde(default, deserialize_with = "multiline")]
    pub filter_expression: Option<String>,
}
