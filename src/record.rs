//! Audit record of a requested transformation.

use crate::simulate::{Outcome, RejectReason};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Executed,
    Unsupported,
    Invalid,
}

/// Everything a persistence layer needs to log one transformation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformationRecord {
    pub prompt: Option<String>,
    pub generated_sql: String,
    pub status: ExecutionStatus,
    pub result: String,
    pub affected_tables: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TransformationRecord {
    pub fn new(
        prompt: Option<String>,
        generated_sql: impl Into<String>,
        outcome: &Outcome,
        created_at: DateTime<Utc>,
    ) -> Self {
        let status = match outcome {
            Outcome::Applied { .. } => ExecutionStatus::Executed,
            Outcome::Rejected {
                reason: RejectReason::Unsupported,
                ..
            } => ExecutionStatus::Unsupported,
            Outcome::Rejected {
                reason: RejectReason::Invalid,
                ..
            } => ExecutionStatus::Invalid,
        };

        Self {
            prompt,
            generated_sql: generated_sql.into(),
            status,
            result: outcome.summary(),
            affected_tables: outcome.affected_tables().to_vec(),
            created_at,
        }
    }
}
