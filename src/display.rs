//! Plain-text schema inspection tables.

use crate::schema::{Column, Schema, Table};
use unicode_width::UnicodeWidthStr;

const HEADERS: [&str; 4] = ["Column", "Type", "Nullable", "Keys"];

/// Render every table as an aligned column listing, followed by relationships.
pub fn render_schema(schema: &Schema) -> String {
    let mut output = String::new();

    for (i, table) in schema.tables.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        render_table(&mut output, table);
    }

    if !schema.relationships.is_empty() {
        output.push_str(&format!("\nRelationships ({})\n", schema.relationships.len()));
        for rel in &schema.relationships {
            output.push_str(&format!(
                "  {}.{} -> {}.{}",
                rel.from_table, rel.from_column, rel.to_table, rel.to_column
            ));
            if !rel.constraint_name.is_empty() {
                output.push_str(&format!(" ({})", rel.constraint_name));
            }
            output.push('\n');
        }
    }

    output
}

/// Render only the named tables, in the order given. Unknown names are skipped.
pub fn render_tables(schema: &Schema, names: &[String]) -> String {
    let mut output = String::new();

    for (i, table) in names.iter().filter_map(|n| schema.find_table(n)).enumerate() {
        if i > 0 {
            output.push('\n');
        }
        render_table(&mut output, table);
    }

    output
}

fn render_table(output: &mut String, table: &Table) {
    let count = table.columns.len();
    output.push_str(&format!(
        "{} ({} column{})\n",
        table.name,
        count,
        if count == 1 { "" } else { "s" }
    ));

    let rows: Vec<[String; 4]> = table.columns.iter().map(row).collect();

    let mut widths = HEADERS.map(|h| h.width());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.width());
        }
    }

    push_row(output, &HEADERS.map(str::to_string), &widths);
    let separator = widths.map(|w| "-".repeat(w));
    push_row(output, &separator, &widths);
    for row in &rows {
        push_row(output, row, &widths);
    }
}

fn row(column: &Column) -> [String; 4] {
    let mut keys = Vec::new();
    if column.is_primary_key {
        keys.push("PK");
    }
    if column.is_foreign_key {
        keys.push("FK");
    }
    [
        column.name.clone(),
        column.data_type.clone(),
        if column.is_nullable { "YES" } else { "NO" }.to_string(),
        keys.join(", "),
    ]
}

fn push_row(output: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    // Trailing empty cells are left off entirely
    let used = cells.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);

    let mut line = String::from("  ");
    for (i, (cell, width)) in cells.iter().zip(widths.iter()).take(used).enumerate() {
        if i > 0 {
            line.push_str(" | ");
        }
        line.push_str(cell);
        // Pad by display width, not byte or char count
        line.push_str(&" ".repeat(width.saturating_sub(cell.width())));
    }
    output.push_str(line.trim_end());
    output.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Relationship, RelationshipKind};

    #[test]
    fn test_render_table() {
        let table = Table::new(
            "users",
            vec![
                Column {
                    name: "id".to_string(),
                    data_type: "integer".to_string(),
                    is_nullable: false,
                    is_primary_key: true,
                    is_foreign_key: false,
                },
                Column::new("email", "varchar"),
            ],
        );
        let mut out = String::new();
        render_table(&mut out, &table);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "users (2 columns)");
        assert_eq!(lines[1], "  Column | Type    | Nullable | Keys");
        assert_eq!(lines[2], "  ------ | ------- | -------- | ----");
        assert_eq!(lines[3], "  id     | integer | NO       | PK");
        assert_eq!(lines[4], "  email  | varchar | YES");
    }

    #[test]
    fn test_wide_characters_aligned() {
        let table = Table::new("t", vec![Column::new("名前", "text"), Column::new("id", "int")]);
        let mut out = String::new();
        render_table(&mut out, &table);

        let lines: Vec<&str> = out.lines().collect();
        // "名前" occupies 4 columns, same as "id  "
        assert_eq!(lines[3], "  名前   | text | YES");
        assert_eq!(lines[4], "  id     | int  | YES");
    }

    #[test]
    fn test_render_named_tables() {
        let schema = Schema::new(
            vec![
                Table::new("users", vec![Column::new("id", "int")]),
                Table::new("orders", vec![Column::new("id", "int")]),
            ],
            vec![],
        );
        let out = render_tables(&schema, &["ORDERS".to_string(), "ghosts".to_string()]);
        assert!(out.starts_with("orders (1 column)\n"));
        assert!(!out.contains("users"));
        assert_eq!(render_tables(&schema, &[]), "");
    }

    #[test]
    fn test_relationships_listed() {
        let schema = Schema::new(
            vec![Table::new("orders", vec![])],
            vec![Relationship {
                from_table: "orders".to_string(),
                to_table: "users".to_string(),
                from_column: "user_id".to_string(),
                to_column: "id".to_string(),
                constraint_name: "fk_orders_user".to_string(),
                kind: RelationshipKind::ManyToOne,
            }],
        );
        let out = render_schema(&schema);
        assert!(out.contains("orders (0 columns)"));
        assert!(out.contains("  orders.user_id -> users.id (fk_orders_user)\n"));
    }
}
