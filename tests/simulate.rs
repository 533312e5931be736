use ddlsim::{simulate, Outcome, RejectReason, Schema};

fn ecommerce() -> Schema {
    serde_json::from_str(
        r#"{
        "tables": [
            {"name": "users", "columns": [
                {"name": "id", "data_type": "integer", "is_nullable": false, "is_primary_key": true},
                {"name": "email", "data_type": "varchar", "is_nullable": false},
                {"name": "full_name", "data_type": "varchar"}
            ]},
            {"name": "orders", "columns": [
                {"name": "id", "data_type": "integer", "is_nullable": false, "is_primary_key": true},
                {"name": "user_id", "data_type": "integer", "is_nullable": false, "is_foreign_key": true},
                {"name": "total_amount", "data_type": "decimal"}
            ]}
        ],
        "relationships": [
            {"from_table": "orders", "to_table": "users", "from_column": "user_id", "to_column": "id",
             "constraint_name": "fk_orders_user", "relationship_type": "many-to-one"}
        ]
    }"#,
    )
    .unwrap()
}

fn applied_schema(outcome: Outcome) -> Schema {
    match outcome {
        Outcome::Applied { schema, .. } => schema,
        Outcome::Rejected { messages, .. } => panic!("expected Applied, got {:?}", messages),
    }
}

fn rejection(outcome: &Outcome) -> (RejectReason, &[String]) {
    match outcome {
        Outcome::Rejected {
            reason, messages, ..
        } => (*reason, messages.as_slice()),
        Outcome::Applied { description, .. } => panic!("expected Rejected, got {}", description),
    }
}

#[test]
fn rejection_is_repeatable() {
    let schema = ecommerce();
    for sql in [
        "UPDATE users SET full_name = 'x'",
        "ALTER TABLE users ADD COLUMN email varchar",
        "ALTER TABLE ghosts DROP COLUMN x",
    ] {
        assert_eq!(simulate(&schema, sql), simulate(&schema, sql));
    }
}

#[test]
fn input_schema_is_never_modified() {
    let schema = ecommerce();
    let before = schema.clone();
    for sql in [
        "ALTER TABLE users ADD COLUMN phone varchar",
        "ALTER TABLE users DROP COLUMN email",
        "ALTER TABLE users RENAME COLUMN full_name TO display_name",
        "CREATE TABLE reviews (id int PRIMARY KEY, user_id int REFERENCES users(id))",
        "CREATE INDEX idx_orders_user ON orders (user_id)",
        "ALTER TABLE users ADD COLUMN email text",
        "DELETE FROM users",
    ] {
        let _ = simulate(&schema, sql);
        assert_eq!(schema, before, "schema changed by {:?}", sql);
    }
}

#[test]
fn add_then_drop_restores_schema() {
    let schema = ecommerce();
    let added = applied_schema(simulate(&schema, "ALTER TABLE users ADD COLUMN c int"));
    assert_ne!(added, schema);
    let dropped = applied_schema(simulate(&added, "ALTER TABLE users DROP COLUMN c"));
    assert_eq!(dropped, schema);
}

#[test]
fn duplicate_add_rejected() {
    let outcome = simulate(&ecommerce(), "ALTER TABLE users ADD COLUMN email varchar");
    let (reason, messages) = rejection(&outcome);
    assert_eq!(reason, RejectReason::Invalid);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("already exists"));
}

#[test]
fn unknown_table_rejected() {
    let outcome = simulate(&ecommerce(), "ALTER TABLE ghosts ADD COLUMN x int");
    let (reason, messages) = rejection(&outcome);
    assert_eq!(reason, RejectReason::Invalid);
    assert!(messages[0].contains("does not exist"));
}

#[test]
fn keywords_and_names_case_insensitive() {
    let schema = ecommerce();
    let upper = applied_schema(simulate(&schema, "ALTER TABLE USERS ADD COLUMN Phone varchar"));
    let lower = applied_schema(simulate(&schema, "alter table users add column phone varchar"));

    let upper_users = upper.find_table("users").unwrap();
    let lower_users = lower.find_table("users").unwrap();
    assert_eq!(upper_users.columns.len(), lower_users.columns.len());
    assert_eq!(upper_users.columns[3].name, "Phone");
    assert_eq!(lower_users.columns[3].name, "phone");
    // table keeps its stored name
    assert_eq!(upper_users.name, "users");
}

#[test]
fn unsupported_statement_passes_through() {
    let outcome = simulate(&ecommerce(), "UPDATE users SET name = 'x'");
    let (reason, messages) = rejection(&outcome);
    assert_eq!(reason, RejectReason::Unsupported);
    assert_eq!(messages.len(), 1);
}

#[test]
fn compound_alter_is_unsupported() {
    let outcome = simulate(
        &ecommerce(),
        "ALTER TABLE users ADD COLUMN a int, ADD COLUMN b int",
    );
    assert_eq!(rejection(&outcome).0, RejectReason::Unsupported);
}

#[test]
fn all_violations_reported_together() {
    let outcome = simulate(
        &ecommerce(),
        "ALTER TABLE users RENAME COLUMN nickname TO email",
    );
    let (reason, messages) = rejection(&outcome);
    assert_eq!(reason, RejectReason::Invalid);
    assert_eq!(messages.len(), 2);
}

#[test]
fn create_index_scenario() {
    let schema: Schema = serde_json::from_str(
        r#"{
        "tables": [{"name": "products", "columns": [
            {"name": "id", "data_type": "integer", "is_nullable": false, "is_primary_key": true},
            {"name": "price", "data_type": "decimal"}
        ]}],
        "relationships": []
    }"#,
    )
    .unwrap();

    let outcome = simulate(&schema, "CREATE INDEX idx_price ON products (price)");
    let Outcome::Applied {
        schema: after,
        description,
        ..
    } = outcome
    else {
        panic!("expected Applied");
    };
    assert_eq!(after, schema);
    assert_eq!(description, "Created index 'idx_price' on products.price");
}

#[test]
fn created_table_appears_in_diagram() {
    let outcome = simulate(
        &ecommerce(),
        "CREATE TABLE reviews (id SERIAL PRIMARY KEY, user_id INT NOT NULL REFERENCES users(id), rating INT)",
    );
    let Outcome::Applied {
        schema, diagram, ..
    } = outcome
    else {
        panic!("expected Applied");
    };
    assert_eq!(schema.tables.len(), 3);
    assert!(diagram.contains("    reviews {\n"));
    assert!(diagram.contains("        int user_id FK \"NOT NULL\"\n"));
    assert!(diagram.contains("    users ||--o{ orders : \"fk_orders_user\"\n"));
}

#[test]
fn chained_transformations() {
    let mut schema = ecommerce();
    for sql in [
        "CREATE TABLE categories (id int PRIMARY KEY, name varchar(100) NOT NULL)",
        "ALTER TABLE categories ADD COLUMN description text",
        "ALTER TABLE categories RENAME COLUMN description TO summary",
        "CREATE INDEX idx_categories_name ON categories (name)",
    ] {
        schema = applied_schema(simulate(&schema, sql));
    }
    let categories = schema.find_table("categories").unwrap();
    let names: Vec<&str> = categories.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "summary"]);
}

#[test]
fn malformed_operands_are_unsupported() {
    let schema = ecommerce();
    for sql in [
        "ALTER TABLE users ADD COLUMN phone",
        "ALTER TABLE users RENAME COLUMN full_name TO",
        "CREATE TABLE reviews (user_id int REFERENCES)",
        "CREATE INDEX ON users (email)",
    ] {
        let outcome = simulate(&schema, sql);
        let (reason, messages) = rejection(&outcome);
        assert_eq!(reason, RejectReason::Unsupported, "{:?}", sql);
        assert!(messages[0].starts_with("malformed "), "{:?}", messages);
        assert!(outcome.affected_tables().is_empty());
    }
}

#[test]
fn name_casing_does_not_change_outcome() {
    let schema = ecommerce();
    for (upper, lower) in [
        (
            "ALTER TABLE USERS DROP COLUMN FULL_NAME",
            "alter table users drop column full_name",
        ),
        (
            "ALTER TABLE Users RENAME COLUMN Full_Name TO display_name",
            "alter table users rename column full_name to display_name",
        ),
        (
            "CREATE INDEX idx_email ON USERS (EMAIL)",
            "create index idx_email on users (email)",
        ),
    ] {
        let outcome = simulate(&schema, upper);
        assert!(outcome.is_applied(), "{:?}", upper);
        assert_eq!(outcome, simulate(&schema, lower));
    }
}

#[test]
fn rename_onto_existing_column_rejected() {
    let schema = ecommerce();
    for sql in [
        "ALTER TABLE users RENAME COLUMN email TO email",
        "ALTER TABLE users RENAME COLUMN full_name TO EMAIL",
    ] {
        let outcome = simulate(&schema, sql);
        let (reason, messages) = rejection(&outcome);
        assert_eq!(reason, RejectReason::Invalid);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].ends_with("already exists on table 'users'"));
    }
}

#[test]
fn key_value_table_keeps_every_column() {
    let outcome = simulate(
        &ecommerce(),
        "CREATE TABLE settings (key text NOT NULL, value text)",
    );
    let Outcome::Applied {
        schema,
        description,
        ..
    } = outcome
    else {
        panic!("expected Applied");
    };
    let settings = schema.find_table("settings").unwrap();
    let names: Vec<&str> = settings.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["key", "value"]);
    assert_eq!(description, "Created table 'settings' with 2 columns");

    let added = applied_schema(simulate(&schema, "ALTER TABLE settings ADD COLUMN index int"));
    assert_eq!(added.find_table("settings").unwrap().columns[2].name, "index");
}
