//! Build the metadata graph from a source object graph
//!
//! Extraction is a single depth-first traversal in three passes:
//! 1. tables with their columns, measures, hierarchies and calculation groups
//! 2. relationships, resolved by name against the tables built in pass 1
//! 3. roles and their table permissions, resolved the same way
//!
//! The source graph is never modified and no source object identity is
//! carried over into the result.

mod date_table;
mod lookup;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, trace};

use crate::error::DaxModelError;
use crate::metadata::{
    CalculationGroup, CalculationItem, Column, ColumnId, DaxExpression, DaxModel, DaxName,
    DaxNote, ExtractorInfo, Measure, PartitionMode, Relationship, Role, Table, TableId,
    TablePermission, TableSourceType, UserHierarchy,
};
use crate::source::{self, ColumnType, ModeType, PartitionSource};

pub use date_table::{infer_date_table, DateTableRule, TIME_DATA_CATEGORY};
use lookup::{lookup_column, Lookup, TableIndex};

/// Annotation set on tables that Power BI generates for a single date column
pub const LOCAL_DATE_TABLE_ANNOTATION: &str = "__PBI_LocalDateTable";
/// Annotation set on the template those local date tables are created from
pub const TEMPLATE_DATE_TABLE_ANNOTATION: &str = "__PBI_TemplateDateTable";

/// Extract the metadata graph of `source`.
///
/// `extractor` identifies the extracting tool (this crate when `None`);
/// `application` identifies the calling application and is only recorded when
/// a source is given. Without a source the identity-only model is returned.
///
/// # Errors
/// Fails when a relationship, table permission, or hierarchy level refers to
/// a name that matches no entity or more than one, or when two tables share a
/// name.
pub fn extract_model(
    source: Option<&source::Database>,
    extractor: Option<&ExtractorInfo>,
    application: Option<&ExtractorInfo>,
) -> Result<DaxModel> {
    let extractor = extractor.cloned().unwrap_or_else(ExtractorInfo::current);

    let Some(database) = source else {
        return Ok(DaxModel::new(&extractor, None));
    };

    let mut model = DaxModel::new(&extractor, application);
    let source_model = &database.model;

    for table in &source_model.tables {
        add_table(&mut model, source_model, table)?;
    }
    debug!(tables = model.tables.len(), "extracted tables");

    let index = TableIndex::new(&model);

    for relationship in &source_model.relationships {
        let relationship = build_relationship(&model, &index, relationship)?;
        model.relationships.push(relationship);
    }
    debug!(
        relationships = model.relationships.len(),
        "resolved relationships"
    );

    for role in &source_model.roles {
        let role = build_role(&index, role)?;
        model.roles.push(role);
    }
    debug!(roles = model.roles.len(), "resolved roles");

    model.default_mode = partition_mode(source_model.default_mode);
    model.culture = source_model.culture.clone();
    model.compatibility_level = database.compatibility_level;
    model.compatibility_mode = Some(database.compatibility_mode.to_string());
    model.last_processed = database.last_processed;
    model.last_update = database.last_update;
    model.version = database.version;
    model.extraction_date = Utc::now();

    Ok(model)
}

fn add_table(
    model: &mut DaxModel,
    source_model: &source::Model,
    table: &source::Table,
) -> Result<TableId> {
    let table_id = model.next_table_id();

    let first_source = table.partitions.first().and_then(|p| p.source.as_ref());
    let (table_type, table_expression) = match first_source {
        Some(PartitionSource::Calculated { expression }) => (
            TableSourceType::CalculatedTable,
            DaxExpression::from_source(expression.as_deref()),
        ),
        Some(PartitionSource::CalculationGroup) => (TableSourceType::CalculationGroup, None),
        _ => (TableSourceType::Ordinary, None),
    };

    let date_rule = infer_date_table(source_model, table);
    trace!(table = %table.name, ?table_type, ?date_rule, "extracting table");

    let mut dax_table = Table {
        table_name: DaxName::from(table.name.as_str()),
        is_hidden: table.is_hidden,
        is_private: table.is_private,
        is_date_table: date_rule.is_some(),
        is_local_date_table: has_true_annotation(table, LOCAL_DATE_TABLE_ANNOTATION),
        is_template_date_table: has_true_annotation(table, TEMPLATE_DATE_TABLE_ANNOTATION),
        table_type,
        table_expression,
        description: DaxNote::new(table.description.as_deref()),
        ..Default::default()
    };

    for column in &table.columns {
        dax_table.columns.push(build_column(table_id, column));
    }

    for measure in &table.measures {
        dax_table.measures.push(build_measure(table_id, measure));
    }

    for hierarchy in &table.hierarchies {
        let user_hierarchy = build_user_hierarchy(&dax_table, table_id, hierarchy)?;
        dax_table.user_hierarchies.push(user_hierarchy);
    }

    if let Some(calculation_group) = &table.calculation_group {
        dax_table.calculation_group = Some(CalculationGroup {
            table: table_id,
            precedence: calculation_group.precedence,
            calculation_items: calculation_group
                .calculation_items
                .iter()
                .map(build_calculation_item)
                .collect(),
        });

        // Best effort: the first column that is not the row number is taken
        // as the attribute. Nothing in the source links the two.
        if let Some(column) = dax_table.columns.iter_mut().find(|c| !c.is_row_number) {
            column.is_calculation_group_attribute = true;
        }
    }

    Ok(model.add_table(dax_table)?)
}

fn has_true_annotation(table: &source::Table, name: &str) -> bool {
    table.annotation(name) == Some("true")
}

fn build_column(table: TableId, column: &source::Column) -> Column {
    let column_expression = if column.column_type == ColumnType::Calculated {
        DaxExpression::from_source(column.expression.as_deref())
    } else {
        None
    };

    let mut dax_column = Column {
        data_type: column.data_type.to_string(),
        is_hidden: column.is_hidden,
        encoding_hint: column.encoding_hint.to_string(),
        is_available_in_mdx: column.is_available_in_mdx,
        is_key: column.is_key,
        is_nullable: column.is_nullable,
        is_unique: column.is_unique,
        keep_unique_rows: column.keep_unique_rows,
        sort_by_column_name: DaxName::new(column.sort_by_column.as_deref()),
        is_row_number: column.column_type == ColumnType::RowNumber,
        state: column.state.to_string(),
        column_type: column.column_type.to_string(),
        column_expression,
        display_folder: DaxNote::new(column.display_folder.as_deref()),
        format_string: column.format_string.clone(),
        description: DaxNote::new(column.description.as_deref()),
        ..Column::new(table, column.name.as_str())
    };

    // Only an explicit "not inferred" is recorded, together with the column it came from
    if column.column_type == ColumnType::CalculatedTableColumn && !column.is_name_inferred {
        dax_column.is_name_inferred = Some(column.is_name_inferred);
        dax_column.source_column = DaxName::new(column.source_column.as_deref());
    }

    if let Some(details) = &column.related_column_details {
        dax_column.group_by_columns.extend(
            details
                .group_by_columns
                .iter()
                .map(|g| DaxName::from(g.grouping_column.as_str())),
        );
    }

    dax_column
}

fn build_measure(table: TableId, measure: &source::Measure) -> Measure {
    let kpi = measure.kpi.as_ref();
    Measure {
        table,
        measure_name: DaxName::from(measure.name.as_str()),
        measure_expression: DaxExpression::from_source(measure.expression.as_deref()),
        format_string_expression: DaxExpression::from_source(
            measure
                .format_string_definition
                .as_ref()
                .and_then(|f| f.expression.as_deref()),
        ),
        format_string: measure.format_string.clone(),
        data_type: measure.data_type.to_string(),
        is_hidden: measure.is_hidden,
        display_folder: DaxNote::new(measure.display_folder.as_deref()),
        description: DaxNote::new(measure.description.as_deref()),
        detail_rows_expression: DaxExpression::from_source(
            measure
                .detail_rows_definition
                .as_ref()
                .and_then(|d| d.expression.as_deref()),
        ),
        kpi_status_expression: DaxExpression::from_source(
            kpi.and_then(|k| k.status_expression.as_deref()),
        ),
        kpi_target_expression: DaxExpression::from_source(
            kpi.and_then(|k| k.target_expression.as_deref()),
        ),
        kpi_target_format_string: kpi.and_then(|k| k.target_format_string.clone()),
        kpi_trend_expression: DaxExpression::from_source(
            kpi.and_then(|k| k.trend_expression.as_deref()),
        ),
    }
}

/// Levels are ordered by ordinal and must refer to columns already added to `table`
fn build_user_hierarchy(
    table: &Table,
    table_id: TableId,
    hierarchy: &source::Hierarchy,
) -> Result<UserHierarchy> {
    let mut levels: Vec<&source::Level> = hierarchy.levels.iter().collect();
    levels.sort_by_key(|l| l.ordinal);

    let mut level_columns: Vec<ColumnId> = Vec::with_capacity(levels.len());
    for level in levels {
        match lookup_column(table, &level.column) {
            Lookup::Found(id) => level_columns.push(id),
            Lookup::Missing => {
                return Err(DaxModelError::HierarchyLevelNotFound {
                    table: table.table_name.to_string(),
                    hierarchy: hierarchy.name.clone(),
                    level: level.name.clone(),
                    column: level.column.clone(),
                }
                .into())
            }
            Lookup::Ambiguous(count) => {
                return Err(DaxModelError::AmbiguousColumn {
                    table: table.table_name.to_string(),
                    column: level.column.clone(),
                    count,
                }
                .into())
            }
        }
    }

    Ok(UserHierarchy {
        table: table_id,
        hierarchy_name: DaxName::from(hierarchy.name.as_str()),
        is_hidden: hierarchy.is_hidden,
        levels: level_columns,
    })
}

fn build_calculation_item(item: &source::CalculationItem) -> CalculationItem {
    let format_string = item.format_string_definition.as_ref();
    CalculationItem {
        item_name: DaxName::from(item.name.as_str()),
        item_expression: DaxExpression::from_source(item.expression.as_deref()),
        format_string_definition: DaxExpression::from_source(
            format_string.and_then(|f| f.expression.as_deref()),
        ),
        state: item.state.to_string(),
        error_message: item.error_message.clone(),
        format_string_state: format_string.map(|f| f.state.to_string()),
        format_string_error_message: format_string.and_then(|f| f.error_message.clone()),
        description: DaxNote::new(item.description.as_deref()),
    }
}

fn build_relationship(
    model: &DaxModel,
    index: &TableIndex,
    relationship: &source::Relationship,
) -> Result<Relationship> {
    let from_column =
        index.resolve_column(model, &relationship.from_table, &relationship.from_column)?;
    let to_column = index.resolve_column(model, &relationship.to_table, &relationship.to_column)?;

    trace!(
        from = %model.qualified_column_name(from_column),
        to = %model.qualified_column_name(to_column),
        "resolved relationship"
    );

    Ok(Relationship {
        name: relationship.name.clone(),
        from_column,
        to_column,
        from_cardinality_type: relationship.from_cardinality.to_string(),
        to_cardinality_type: relationship.to_cardinality.to_string(),
        is_active: relationship.is_active,
        rely_on_referential_integrity: relationship.rely_on_referential_integrity,
        cross_filtering_behavior: relationship.cross_filtering_behavior.to_string(),
        security_filtering_behavior: relationship.security_filtering_behavior.to_string(),
        join_on_date_behavior: relationship.join_on_date_behavior.to_string(),
        relationship_type: relationship.relationship_type.to_string(),
    })
}

fn build_role(index: &TableIndex, role: &source::ModelRole) -> Result<Role> {
    let mut table_permissions = Vec::with_capacity(role.table_permissions.len());
    for permission in &role.table_permissions {
        table_permissions.push(TablePermission {
            table: index.resolve_table(&permission.name)?,
            filter_expression: DaxExpression::from_source(permission.filter_expression.as_deref()),
        });
    }

    Ok(Role {
        role_name: DaxName::from(role.name.as_str()),
        table_permissions,
    })
}

fn partition_mode(mode: ModeType) -> PartitionMode {
    match mode {
        ModeType::Import => PartitionMode::Import,
        ModeType::DirectQuery => PartitionMode::DirectQuery,
        ModeType::Default => PartitionMode::Default,
        ModeType::Push => PartitionMode::Push,
        ModeType::Dual => PartitionMode::Dual,
        ModeType::DirectLake => PartitionMode::DirectLake,
        ModeType::Unknown => PartitionMode::Default,
    }
}
