//! Classify -> validate -> apply pipeline.
//!
//! Each call walks `Idle -> Classified -> {Rejected(unsupported) | Validated ->
//! {Rejected(invalid) | Applied}}` and keeps no state between calls. The input
//! schema is only read; an applied statement yields a new schema.

use crate::diagram::{render_mermaid, DetailLevel};
use crate::mutate::apply;
use crate::schema::Schema;
use crate::sql::{classify, Classification};
use crate::validate::validate;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The statement is not one of the simulated forms.
    Unsupported,
    /// The statement conflicts with the schema.
    Invalid,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::Unsupported => "unsupported",
            RejectReason::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Applied {
        schema: Schema,
        description: String,
        /// Mermaid diagram regenerated from `schema`.
        diagram: String,
        affected_tables: Vec<String>,
    },
    Rejected {
        reason: RejectReason,
        messages: Vec<String>,
        affected_tables: Vec<String>,
    },
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }

    pub fn affected_tables(&self) -> &[String] {
        match self {
            Outcome::Applied {
                affected_tables, ..
            }
            | Outcome::Rejected {
                affected_tables, ..
            } => affected_tables,
        }
    }

    /// One-line summary: the change description or the joined messages.
    pub fn summary(&self) -> String {
        match self {
            Outcome::Applied { description, .. } => description.clone(),
            Outcome::Rejected { messages, .. } => messages.join("; "),
        }
    }
}

/// Simulate `sql` against `schema` with a full-detail diagram.
pub fn simulate(schema: &Schema, sql: &str) -> Outcome {
    simulate_with(schema, sql, DetailLevel::All)
}

/// Simulate `sql` against `schema`, rendering the diagram at `detail`.
pub fn simulate_with(schema: &Schema, sql: &str, detail: DetailLevel) -> Outcome {
    let op = match classify(sql) {
        Classification::Recognized(op) => op,
        Classification::NotRecognized(reason) => {
            debug!(%reason, "rejected: unsupported statement");
            return Outcome::Rejected {
                reason: RejectReason::Unsupported,
                messages: vec![reason.to_string()],
                affected_tables: vec![],
            };
        }
    };
    debug!(kind = op.kind(), table = op.table(), "classified statement");

    let validated = match validate(&op, schema) {
        Ok(validated) => validated,
        Err(violations) => {
            debug!(
                kind = op.kind(),
                violations = violations.len(),
                "rejected: invalid operation"
            );
            return Outcome::Rejected {
                reason: RejectReason::Invalid,
                messages: violations.iter().map(|v| v.to_string()).collect(),
                affected_tables: vec![op.table().to_string()],
            };
        }
    };

    let change = apply(validated);
    debug!(kind = op.kind(), description = %change.description, "applied operation");

    let diagram = render_mermaid(&change.schema, detail);
    Outcome::Applied {
        schema: change.schema,
        description: change.description,
        diagram,
        affected_tables: change.affected_tables,
    }
}
