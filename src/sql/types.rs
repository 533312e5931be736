//! SQL type names as single-token diagram labels.

/// Canonical, lowercase, single-token form of a SQL type.
///
/// Parameters are dropped (`VARCHAR(255)` -> `varchar`), common aliases are
/// folded, and any remaining whitespace becomes `_` so the result is a valid
/// Mermaid attribute type.
pub fn canonical_type(sql_type: &str) -> String {
    let lower = sql_type.trim().to_lowercase();
    let is_array = lower.ends_with("[]");
    let base = lower.trim_end_matches("[]");
    let base = base.split('(').next().unwrap_or(base).trim();
    let base = base.split_whitespace().collect::<Vec<_>>().join(" ");

    let mapped = match base.as_str() {
        "" => "unknown".to_string(),

        // Integer types
        "int" | "int4" | "integer" | "serial" | "serial4" => "int".to_string(),
        "bigint" | "int8" | "bigserial" | "serial8" => "bigint".to_string(),
        "smallint" | "int2" | "smallserial" | "serial2" => "smallint".to_string(),

        // Floating point
        "real" | "float4" | "float" => "float".to_string(),
        "double precision" | "float8" | "double" => "double".to_string(),
        "decimal" | "numeric" => "decimal".to_string(),

        // String types
        "varchar" | "character varying" => "varchar".to_string(),
        "char" | "character" => "char".to_string(),
        "text" | "longtext" | "mediumtext" | "tinytext" => "text".to_string(),

        // Date/time
        "timestamp" | "timestamptz" | "timestamp with time zone"
        | "timestamp without time zone" | "datetime" => "timestamp".to_string(),
        "date" => "date".to_string(),
        "time" | "timetz" | "time with time zone" | "time without time zone" => {
            "time".to_string()
        }

        "boolean" | "bool" => "boolean".to_string(),
        "json" | "jsonb" => "json".to_string(),

        // Default: keep original
        other => other.replace(' ', "_"),
    };

    if is_array {
        format!("{}_array", mapped)
    } else {
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_dropped() {
        assert_eq!(canonical_type("VARCHAR(255)"), "varchar");
        assert_eq!(canonical_type("numeric(10,2)"), "decimal");
    }

    #[test]
    fn test_aliases_folded() {
        assert_eq!(canonical_type("SERIAL"), "int");
        assert_eq!(canonical_type("character varying"), "varchar");
        assert_eq!(canonical_type("TIMESTAMP WITH TIME ZONE"), "timestamp");
        assert_eq!(canonical_type("JSONB"), "json");
    }

    #[test]
    fn test_single_token() {
        assert_eq!(canonical_type("user defined"), "user_defined");
        assert_eq!(canonical_type("text[]"), "text_array");
        assert_eq!(canonical_type(""), "unknown");
    }
}
