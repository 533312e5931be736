//! Applies a validated operation to a copy of the schema.

use crate::schema::{names_match, Column, Schema, Table};
use crate::sql::TableConstraint;
use crate::validate::{Resolved, Validated};

/// Result of applying an operation: the new schema and what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub schema: Schema,
    pub description: String,
    pub affected_tables: Vec<String>,
}

/// Produce a new schema reflecting `validated`. The schema it was validated
/// against is left untouched.
pub fn apply(validated: Validated<'_>) -> Change {
    let mut schema = validated.schema.clone();

    let (table_name, description) = match validated.target {
        Resolved::AddColumn {
            table,
            column,
            data_type,
        } => {
            let table = &mut schema.tables[table];
            table.columns.push(Column::new(column, data_type));
            (
                table.name.clone(),
                format!(
                    "Added column '{}' ({}) to {}",
                    column, data_type, table.name
                ),
            )
        }
        Resolved::DropColumn { table, column } => {
            let table = &mut schema.tables[table];
            let dropped = table.columns.remove(column);
            (
                table.name.clone(),
                format!("Dropped column '{}' from {}", dropped.name, table.name),
            )
        }
        Resolved::RenameColumn { table, column, new } => {
            let table = &mut schema.tables[table];
            let old = std::mem::replace(&mut table.columns[column].name, new.to_string());
            (
                table.name.clone(),
                format!("Renamed column {}.{} to '{}'", table.name, old, new),
            )
        }
        Resolved::CreateTable {
            table,
            columns,
            constraints,
        } => {
            let created = build_table(table, columns, constraints);
            let description = format!(
                "Created table '{}' with {} column{}",
                created.name,
                created.columns.len(),
                if created.columns.len() == 1 { "" } else { "s" }
            );
            schema.tables.push(created);
            (table.to_string(), description)
        }
        Resolved::CreateIndex {
            table,
            column,
            index,
        } => {
            let table = &schema.tables[table];
            (
                table.name.clone(),
                format!(
                    "Created index '{}' on {}.{}",
                    index, table.name, table.columns[column].name
                ),
            )
        }
    };

    Change {
        schema,
        description,
        affected_tables: vec![table_name],
    }
}

fn build_table(name: &str, columns: &[Column], constraints: &[TableConstraint]) -> Table {
    let mut columns = columns.to_vec();

    for constraint in constraints {
        match constraint {
            TableConstraint::PrimaryKey { columns: keys } => {
                for col in columns.iter_mut() {
                    if keys.iter().any(|k| names_match(k, &col.name)) {
                        col.is_primary_key = true;
                        col.is_nullable = false;
                    }
                }
            }
            TableConstraint::ForeignKey { columns: keys, .. } => {
                for col in columns.iter_mut() {
                    if keys.iter().any(|k| names_match(k, &col.name)) {
                        col.is_foreign_key = true;
                    }
                }
            }
        }
    }

    Table::new(name, columns)
}
