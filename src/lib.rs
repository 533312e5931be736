pub mod diagram;
pub mod display;
pub mod error;
pub mod mutate;
pub mod record;
pub mod schema;
pub mod simulate;
pub mod sql;
pub mod validate;

use wasm_bindgen::prelude::*;

pub use diagram::DetailLevel;
pub use error::Error;
pub use schema::{Column, Relationship, RelationshipKind, Schema, Table};
pub use simulate::{simulate, simulate_with, Outcome, RejectReason};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Simulate one SQL statement against a JSON schema, returning the outcome as JSON
#[wasm_bindgen(js_name = "simulateDdl")]
pub fn simulate_ddl(
    schema_json: &str,
    sql: &str,
    detail: Option<String>,
) -> Result<String, String> {
    let schema: Schema = serde_json::from_str(schema_json).map_err(|e| e.to_string())?;
    let outcome = simulate_with(&schema, sql, detail_level(detail.as_deref()));
    serde_json::to_string(&outcome).map_err(|e| e.to_string())
}

/// Render a JSON schema as a Mermaid ER diagram
#[wasm_bindgen(js_name = "schemaToMermaid")]
pub fn schema_to_mermaid(schema_json: &str, detail: Option<String>) -> Result<String, String> {
    let schema: Schema = serde_json::from_str(schema_json).map_err(|e| e.to_string())?;
    Ok(diagram::render_mermaid(
        &schema,
        detail_level(detail.as_deref()),
    ))
}

fn detail_level(detail: Option<&str>) -> DetailLevel {
    detail.and_then(DetailLevel::from_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "tables": [{"name": "users", "columns": [
            {"name": "id", "data_type": "integer", "is_nullable": false, "is_primary_key": true}
        ]}],
        "relationships": []
    }"#;

    #[test]
    fn test_simulate_ddl_json() {
        let out = simulate_ddl(SCHEMA, "ALTER TABLE users ADD COLUMN email text", None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "applied");
        assert_eq!(value["schema"]["tables"][0]["columns"][1]["name"], "email");
    }

    #[test]
    fn test_simulate_ddl_bad_schema() {
        assert!(simulate_ddl("{not json", "ALTER TABLE t ADD COLUMN c int", None).is_err());
    }

    #[test]
    fn test_schema_to_mermaid_detail() {
        let out = schema_to_mermaid(SCHEMA, Some("tables".to_string())).unwrap();
        assert!(out.contains("    users {\n    }\n"));
    }
}
