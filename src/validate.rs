//! Semantic checks of a classified operation against the current schema.

use crate::schema::{names_match, Column, Schema};
use crate::sql::{Operation, TableConstraint};
use serde::Serialize;
use thiserror::Error;

/// A semantic conflict between an operation and the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Violation {
    #[error("table '{table}' does not exist")]
    TableNotFound { table: String },
    #[error("table '{table}' already exists")]
    TableExists { table: String },
    #[error("column '{column}' does not exist on table '{table}'")]
    ColumnNotFound { table: String, column: String },
    #[error("column '{column}' already exists on table '{table}'")]
    ColumnExists { table: String, column: String },
    #[error("column '{column}' is defined more than once in table '{table}'")]
    DuplicateColumn { table: String, column: String },
    #[error("table '{table}' declares more than one primary key")]
    MultiplePrimaryKeys { table: String },
    #[error("column '{column}' named in {clause} is not defined in table '{table}'")]
    UndefinedKeyColumn {
        table: String,
        column: String,
        clause: &'static str,
    },
}

/// An operation with its names resolved to positions in the checked schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolved<'a> {
    AddColumn {
        table: usize,
        column: &'a str,
        data_type: &'a str,
    },
    DropColumn {
        table: usize,
        column: usize,
    },
    RenameColumn {
        table: usize,
        column: usize,
        new: &'a str,
    },
    CreateTable {
        table: &'a str,
        columns: &'a [Column],
        constraints: &'a [TableConstraint],
    },
    CreateIndex {
        table: usize,
        column: usize,
        index: &'a str,
    },
}

/// An operation that passed validation against a specific schema.
///
/// Only [`validate`] constructs this, and it borrows the schema it was checked
/// against, so the resolved positions stay valid until it is applied.
#[derive(Debug)]
pub struct Validated<'a> {
    pub(crate) op: &'a Operation,
    pub(crate) schema: &'a Schema,
    pub(crate) target: Resolved<'a>,
}

impl<'a> Validated<'a> {
    pub fn operation(&self) -> &'a Operation {
        self.op
    }
}

/// Check `op` against `schema`, collecting every applicable violation.
pub fn validate<'a>(op: &'a Operation, schema: &'a Schema) -> Result<Validated<'a>, Vec<Violation>> {
    let mut violations = Vec::new();

    let target = match op {
        Operation::AddColumn {
            table,
            column,
            data_type,
        } => {
            let t = require_table(schema, table, &mut violations);
            if let Some(t) = t {
                let existing = &schema.tables[t];
                if existing.find_column(column).is_some() {
                    violations.push(Violation::ColumnExists {
                        table: existing.name.clone(),
                        column: column.clone(),
                    });
                }
            }
            t.map(|table| Resolved::AddColumn {
                table,
                column,
                data_type,
            })
        }
        Operation::DropColumn { table, column } => {
            require_column(schema, table, column, &mut violations)
                .map(|(table, column)| Resolved::DropColumn { table, column })
        }
        Operation::RenameColumn { table, old, new } => {
            let resolved = require_column(schema, table, old, &mut violations);

            if let Some(t) = schema.table_index(table) {
                let existing = &schema.tables[t];
                if existing.find_column(new).is_some() {
                    violations.push(Violation::ColumnExists {
                        table: existing.name.clone(),
                        column: new.clone(),
                    });
                }
            }
            resolved.map(|(table, column)| Resolved::RenameColumn { table, column, new })
        }
        Operation::CreateTable {
            table,
            columns,
            constraints,
        } => {
            if let Some(existing) = schema.find_table(table) {
                violations.push(Violation::TableExists {
                    table: existing.name.clone(),
                });
            }

            let mut reported: Vec<&str> = Vec::new();
            for (i, col) in columns.iter().enumerate() {
                let seen_before = columns[..i].iter().any(|c| names_match(&c.name, &col.name));
                // Report each duplicated name once
                if seen_before && !reported.iter().any(|r| names_match(r, &col.name)) {
                    reported.push(&col.name);
                    violations.push(Violation::DuplicateColumn {
                        table: table.clone(),
                        column: col.name.clone(),
                    });
                }
            }

            let mut pk_definitions = columns.iter().filter(|c| c.is_primary_key).count();
            for constraint in constraints {
                let (clause, key_columns) = match constraint {
                    TableConstraint::PrimaryKey { columns } => {
                        pk_definitions += 1;
                        ("PRIMARY KEY", columns)
                    }
                    TableConstraint::ForeignKey { columns, .. } => ("FOREIGN KEY", columns),
                };
                for key_col in key_columns {
                    if !columns.iter().any(|c| names_match(&c.name, key_col)) {
                        violations.push(Violation::UndefinedKeyColumn {
                            table: table.clone(),
                            column: key_col.clone(),
                            clause,
                        });
                    }
                }
            }
            if pk_definitions > 1 {
                violations.push(Violation::MultiplePrimaryKeys {
                    table: table.clone(),
                });
            }
            Some(Resolved::CreateTable {
                table,
                columns,
                constraints,
            })
        }
        Operation::CreateIndex {
            index,
            table,
            column,
            ..
        } => require_column(schema, table, column, &mut violations)
            .map(|(table, column)| Resolved::CreateIndex {
                table,
                column,
                index,
            }),
    };

    match target {
        Some(target) if violations.is_empty() => Ok(Validated { op, schema, target }),
        _ => Err(violations),
    }
}

fn require_table(schema: &Schema, table: &str, violations: &mut Vec<Violation>) -> Option<usize> {
    let idx = schema.table_index(table);
    if idx.is_none() {
        violations.push(Violation::TableNotFound {
            table: table.to_string(),
        });
    }
    idx
}

/// Resolve `table.column`, reporting whichever part is missing.
fn require_column(
    schema: &Schema,
    table: &str,
    column: &str,
    violations: &mut Vec<Violation>,
) -> Option<(usize, usize)> {
    let t = require_table(schema, table, violations)?;
    let existing = &schema.tables[t];
    match existing.column_index(column) {
        Some(c) => Some((t, c)),
        None => {
            violations.push(Violation::ColumnNotFound {
                table: existing.name.clone(),
                column: column.to_string(),
            });
            None
        }
    }
}
