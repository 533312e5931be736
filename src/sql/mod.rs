//! SQL statement classification.

mod classify;
mod lexer;
mod types;

pub use classify::{classify, Classification, Operation, TableConstraint, Unsupported};
pub use types::canonical_type;
