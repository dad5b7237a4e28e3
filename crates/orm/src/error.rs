//! Errors

use std::fmt;

use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Domain level error type returned by the compiler and persistence engine.
///
/// Validation failures are always raised before a statement reaches the
/// executor; an [`Error::Execution`] is never retried here (retry policy, if
/// any, belongs to the executor).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A statement could not be built from the given specification.
    #[error("{description}")]
    Validation {
        /// What was wrong with the specification.
        description: String,
    },

    /// A field name does not exist in the schema.
    #[error("field `{field}` does not exist in `{table}`")]
    UnknownField {
        /// The unknown field name.
        field: String,
        /// Table whose schema was consulted.
        table: String,
    },

    /// The executor reported a statement failure.
    #[error("statement failed (code {code}): {message}; sql: {sql}")]
    Execution {
        /// The offending SQL text.
        sql: String,
        /// Driver-reported error code.
        code: String,
        /// Driver-reported message.
        message: String,
    },

    /// A single-row lookup matched more than one row.
    #[error("{description}")]
    Cardinality {
        /// Table the lookup ran against.
        table: String,
        /// What the lookup expected versus what it got.
        description: String,
    },

    /// A duplicate-key failure, classified against the schema.
    #[error("duplicate {kind} entry on `{index}` ({fields:?})")]
    Duplicate {
        /// Whether the primary key or a unique index was violated.
        kind: DuplicateKind,
        /// Offending index name.
        index: String,
        /// Fields making up the offending index.
        fields: Vec<String>,
    },

    /// The schema ingestion document was malformed.
    #[error("{description}")]
    Schema {
        /// What was wrong with the document.
        description: String,
    },
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(description: impl Into<String>) -> Self {
        Self::Validation { description: description.into() }
    }
}

/// Which kind of key a duplicate-entry failure violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKind {
    /// The table's primary key.
    PrimaryKey,
    /// A named unique index.
    UniqueIndex,
}

impl fmt::Display for DuplicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryKey => write!(f, "primary key"),
            Self::UniqueIndex => write!(f, "unique index"),
        }
    }
}
