//! Error types for building and compiling conditions.
//!
//! Every failure is raised synchronously while a relation is being built or
//! compiled; no partial results are returned.

use thiserror::Error;

/// Result type for DSL operations.
pub type DslResult<T> = Result<T, DslError>;

/// Errors raised while building expression trees or resolving joins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DslError {
    /// A join was requested without a predicate or builder block,
    /// or a join block produced something that is not a table.
    #[error("Invalid join specification: {0}")]
    InvalidJoinSpecification(String),

    /// Referenced a column or association that is not declared.
    #[error("Unknown attribute '{name}' on '{relation}'")]
    UnknownAttribute { relation: String, name: String },

    /// An association path could not be mapped to a single relation.
    #[error("Cannot resolve alias for '{path}': {reason}")]
    AliasResolution { path: String, reason: String },

    /// Referenced a relation (table or model) the schema doesn't declare.
    #[error("Unknown relation: '{0}'")]
    UnknownRelation(String),

    /// A value that has no SQL literal form (NaN or infinite floats).
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// An internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DslError {
    pub(crate) fn unknown_attribute(relation: &str, name: &str) -> Self {
        DslError::UnknownAttribute {
            relation: relation.to_string(),
            name: name.to_string(),
        }
    }

    pub(crate) fn alias_resolution(path: impl ToString, reason: impl Into<String>) -> Self {
        DslError::AliasResolution {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
