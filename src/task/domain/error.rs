//! Error types for task relationship validation and parsing.

use thiserror::Error;

/// Errors returned while constructing task relationship values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskRelationDomainError {
    /// The checklist item text is empty after trimming.
    #[error("checklist item text must not be empty")]
    EmptyChecklistText,

    /// The checklist item text exceeds the configured limit.
    #[error("checklist item text has {actual} characters, limit is {limit}")]
    ChecklistTextTooLong {
        /// Number of characters submitted.
        actual: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// A page number of zero was requested.
    #[error("page numbers start at 1")]
    InvalidPageNumber,

    /// A page size of zero was requested.
    #[error("page limit must be at least 1")]
    InvalidPageLimit,
}

/// Error returned while parsing a persisted enumeration value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    /// Name of the enumeration being parsed.
    pub kind: &'static str,
    /// Raw value that failed to parse.
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
