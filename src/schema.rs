//! In-memory schema model: tables, columns and relationships.
//!
//! All name lookups go through [`names_match`], so every component compares
//! identifiers the same way (ASCII case-insensitive).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Ordinal order: display order and DDL order.
    #[serde(default)]
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from_table: String,
    pub to_table: String,
    #[serde(default)]
    pub from_column: String,
    #[serde(default)]
    pub to_column: String,
    #[serde(default)]
    pub constraint_name: String,
    #[serde(default, alias = "relationship_type")]
    pub kind: RelationshipKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    #[default]
    ManyToOne,
    ManyToMany,
}

impl RelationshipKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "one-to-one" => Some(Self::OneToOne),
            "one-to-many" => Some(Self::OneToMany),
            "many-to-one" => Some(Self::ManyToOne),
            "many-to-many" => Some(Self::ManyToMany),
            _ => None,
        }
    }
}

/// Identifier comparison used by every lookup in the crate.
pub fn names_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

impl Column {
    /// A column as `ADD COLUMN` creates it: nullable, no key flags.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            is_primary_key: false,
            is_foreign_key: false,
        }
    }
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| names_match(&c.name, name))
    }

    pub(crate) fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| names_match(&c.name, name))
    }

    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }
}

impl Schema {
    pub fn new(tables: Vec<Table>, relationships: Vec<Relationship>) -> Self {
        Self {
            tables,
            relationships,
        }
    }

    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| names_match(&t.name, name))
    }

    pub(crate) fn table_index(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| names_match(&t.name, name))
    }

    /// Fold the flat row shape of an information-schema introspection into a schema.
    pub fn from_introspection(payload: Introspection) -> Self {
        let mut tables: Vec<Table> = Vec::new();

        for row in payload.columns {
            let idx = match tables.iter().position(|t| t.name == row.table_name) {
                Some(idx) => idx,
                None => {
                    tables.push(Table::new(row.table_name.clone(), vec![]));
                    tables.len() - 1
                }
            };

            // LEFT JOIN rows for tables without columns carry no column name
            let Some(name) = row.column_name else {
                continue;
            };
            tables[idx].columns.push(Column {
                name,
                data_type: row.data_type.unwrap_or_default(),
                is_nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
                is_primary_key: row.is_primary_key,
                is_foreign_key: row.is_foreign_key,
            });
        }

        let relationships = payload
            .foreign_keys
            .into_iter()
            .map(|fk| Relationship {
                from_table: fk.from_table,
                to_table: fk.to_table,
                from_column: fk.from_column,
                to_column: fk.to_column,
                constraint_name: fk.constraint_name,
                kind: RelationshipKind::ManyToOne,
            })
            .collect();

        Self {
            tables,
            relationships,
        }
    }
}

/// Raw output of the table/column and foreign-key introspection queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Introspection {
    #[serde(default)]
    pub columns: Vec<ColumnRow>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnRow {
    pub table_name: String,
    pub column_name: Option<String>,
    pub data_type: Option<String>,
    /// `"YES"` or `"NO"`, as information_schema reports it.
    #[serde(default)]
    pub is_nullable: String,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForeignKeyRow {
    pub from_table: String,
    #[serde(default)]
    pub from_column: String,
    pub to_table: String,
    #[serde(default)]
    pub to_column: String,
    #[serde(default)]
    pub constraint_name: String,
}
