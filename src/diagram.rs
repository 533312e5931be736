//! Mermaid `erDiagram` generation from a schema.

use crate::schema::{Column, Relationship, RelationshipKind, Schema, Table};
use crate::sql::canonical_type;

/// Which columns appear in each entity box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailLevel {
    Tables,
    Pk,
    PkFk,
    #[default]
    All,
}

impl DetailLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tables" => Some(Self::Tables),
            "pk" => Some(Self::Pk),
            "pk_fk" => Some(Self::PkFk),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    fn includes(self, column: &Column) -> bool {
        match self {
            DetailLevel::Tables => false,
            DetailLevel::Pk => column.is_primary_key,
            DetailLevel::PkFk => column.is_primary_key || column.is_foreign_key,
            DetailLevel::All => true,
        }
    }
}

/// Render a schema as a Mermaid ER diagram.
pub fn render_mermaid(schema: &Schema, detail: DetailLevel) -> String {
    let mut output = String::from("erDiagram\n");

    for table in &schema.tables {
        render_table(&mut output, table, detail);
    }

    // Relationships to tables outside the schema cannot be drawn
    for rel in &schema.relationships {
        if let (Some(from), Some(to)) = (
            schema.find_table(&rel.from_table),
            schema.find_table(&rel.to_table),
        ) {
            render_relationship(&mut output, rel, &from.name, &to.name);
        }
    }

    output
}

fn render_table(output: &mut String, table: &Table, detail: DetailLevel) {
    output.push_str(&format!("    {} {{\n", entity_name(&table.name)));

    for column in table.columns.iter().filter(|c| detail.includes(c)) {
        output.push_str(&format!(
            "        {} {}",
            canonical_type(&column.data_type),
            entity_name(&column.name)
        ));
        if column.is_primary_key {
            output.push_str(" PK");
        }
        if column.is_foreign_key {
            output.push_str(" FK");
        }
        if !column.is_nullable {
            output.push_str(" \"NOT NULL\"");
        }
        output.push('\n');
    }

    output.push_str("    }\n\n");
}

/// `from` and `to` are the stored table names, so the line joins the entity boxes.
fn render_relationship(output: &mut String, rel: &Relationship, from: &str, to: &str) {
    let label = if !rel.constraint_name.is_empty() {
        rel.constraint_name.as_str()
    } else if !rel.from_column.is_empty() {
        rel.from_column.as_str()
    } else {
        "references"
    };

    output.push_str(&format!(
        "    {} {} {} : \"{}\"\n",
        entity_name(to),
        cardinality(rel.kind),
        entity_name(from),
        label.replace('"', "'")
    ));
}

fn cardinality(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::ManyToOne => "||--o{",
        RelationshipKind::OneToMany => "}o--||",
        RelationshipKind::OneToOne => "||--||",
        RelationshipKind::ManyToMany => "}o--o{",
    }
}

/// Mermaid entity and attribute names allow word characters and `-` only.
fn entity_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(
            vec![
                Table::new(
                    "users",
                    vec![
                        Column {
                            name: "id".to_string(),
                            data_type: "integer".to_string(),
                            is_nullable: false,
                            is_primary_key: true,
                            is_foreign_key: false,
                        },
                        Column::new("email", "character varying"),
                    ],
                ),
                Table::new(
                    "orders",
                    vec![Column {
                        name: "user_id".to_string(),
                        data_type: "integer".to_string(),
                        is_nullable: false,
                        is_primary_key: false,
                        is_foreign_key: true,
                    }],
                ),
            ],
            vec![
                Relationship {
                    from_table: "orders".to_string(),
                    to_table: "users".to_string(),
                    from_column: "user_id".to_string(),
                    to_column: "id".to_string(),
                    constraint_name: "fk_orders_user".to_string(),
                    kind: RelationshipKind::ManyToOne,
                },
                Relationship {
                    from_table: "orders".to_string(),
                    to_table: "ghosts".to_string(),
                    from_column: String::new(),
                    to_column: String::new(),
                    constraint_name: "fk_ghost".to_string(),
                    kind: RelationshipKind::ManyToOne,
                },
            ],
        )
    }

    #[test]
    fn test_render_all() {
        let out = render_mermaid(&schema(), DetailLevel::All);
        assert!(out.starts_with("erDiagram\n"));
        assert!(out.contains("    users {\n"));
        assert!(out.contains("        int id PK \"NOT NULL\"\n"));
        assert!(out.contains("        varchar email\n"));
        assert!(out.contains("        int user_id FK \"NOT NULL\"\n"));
        assert!(out.contains("    users ||--o{ orders : \"fk_orders_user\"\n"));
    }

    #[test]
    fn test_dangling_relationship_skipped() {
        let out = render_mermaid(&schema(), DetailLevel::All);
        assert!(!out.contains("ghosts"));
    }

    #[test]
    fn test_relationship_uses_stored_table_names() {
        let mut schema = schema();
        schema.relationships[0].from_table = "ORDERS".to_string();
        schema.relationships[0].to_table = "Users".to_string();
        let out = render_mermaid(&schema, DetailLevel::All);
        assert!(out.contains("    users ||--o{ orders : \"fk_orders_user\"\n"));
        assert!(!out.contains("Users"));
    }

    #[test]
    fn test_detail_levels() {
        let out = render_mermaid(&schema(), DetailLevel::Pk);
        assert!(out.contains(" id PK"));
        assert!(!out.contains("email"));
        assert!(!out.contains("user_id FK"));

        let out = render_mermaid(&schema(), DetailLevel::PkFk);
        assert!(out.contains("user_id FK"));
        assert!(!out.contains("email"));

        let out = render_mermaid(&schema(), DetailLevel::Tables);
        assert!(out.contains("    users {\n    }\n"));
    }

    #[test]
    fn test_entity_names_sanitized() {
        assert_eq!(entity_name("User Table"), "User_Table");
        assert_eq!(entity_name("order-items"), "order-items");
    }

    #[test]
    fn test_detail_from_str() {
        assert_eq!(DetailLevel::from_str("pk_fk"), Some(DetailLevel::PkFk));
        assert_eq!(DetailLevel::from_str("everything"), None);
    }
}
